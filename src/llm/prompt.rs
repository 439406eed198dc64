

use crate::meme::models::Template;


pub const SYSTEM_PROMPT: &str = "You are an expert in meme creation. Your task is to select the most appropriate meme template based on a given thought, and generate witty and humorous text for the meme. Ensure that the meme is coherent and funny.";


pub fn format_catalog(templates: &[Template]) -> String {
    templates
        .iter()
        .map(|t| format!("{} (ID: {}, box_count: {})", t.name, t.id, t.box_count))
        .collect::<Vec<_>>()
        .join("\n")
}


pub fn build_selection_prompt(thought: &str, location: &str, templates: &[Template]) -> String {
    let catalog = format_catalog(templates);

    format!(
        "The person is at the following location: {location}. This is their thought: {thought}\n\n\
         Here is a list of available memes and their respective IDs and box counts:\n{catalog}\n\n\
         Based on this thought, which meme template would be the best fit?\n\
         Please provide:\n\
         meme: <name of meme>\n\
         meme_id: <id of meme>\n\
         explanation: <reason for the choice>"
    )
}

pub fn build_fixed_template_prompt(thought: &str, location: &str, template: &Template) -> String {
    format!(
        "The person is at the following location: {location}. This is their thought: {thought}\n\n\
         The meme template to use is: {}",
        format_catalog(std::slice::from_ref(template))
    )
}


pub fn build_caption_prompt(box_count: usize) -> String {
    let mut prompt = format!(
        "Great choice! Now, the selected meme requires {box_count} text boxes (from text0 to text{}). \
         Please provide the text for each text box, ensuring that the combined texts create a \
         coherent and humorous meme that relates to the thought and location:\n",
        box_count.saturating_sub(1)
    );
    for i in 0..box_count {
        prompt.push_str(&format!("text{i}: <text for text box {i}>\n"));
    }
    prompt
}
