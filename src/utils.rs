

pub fn log_preview(text: &str, max_chars: usize) -> String {
    let flat = text.trim().replace("\r\n", " / ").replace('\n', " / ");
    if flat.chars().count() > max_chars {
        format!("{}...", flat.chars().take(max_chars).collect::<String>())
    } else {
        flat
    }
}
