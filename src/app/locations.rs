

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::core::error::{MemeError, Result};
use crate::store::MemeStore;


pub const OTHER_LOCATION: &str = "Other (specify below)";


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationChoices {
    pub options: Vec<String>,
    pub initial: Option<String>,
}

impl LocationChoices {
    pub fn from_labels<R: Rng + ?Sized>(mut labels: Vec<String>, rng: &mut R) -> Self {
        labels.retain(|l| !l.trim().is_empty() && l != OTHER_LOCATION);
        labels.shuffle(rng);
        let initial = labels.choose(rng).cloned();
        labels.push(OTHER_LOCATION.to_string());
        Self { options: labels, initial }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.options.iter().any(|o| o == label)
    }
}


pub async fn load_choices<R: Rng + ?Sized>(
    store: &dyn MemeStore,
    rng: &mut R,
) -> (LocationChoices, Option<String>) {
    match store.all_locations().await {
        Ok(labels) => (LocationChoices::from_labels(labels, rng), None),
        Err(e) => {
            warn!("Failed to list locations: {}", e);
            (
                LocationChoices::from_labels(Vec::new(), rng),
                Some(format!("Error fetching locations: {e}")),
            )
        }
    }
}


pub fn resolve_label(selected: &str, custom: &str) -> Result<String> {
    let label = if selected == OTHER_LOCATION {
        let custom = custom.trim();
        if custom.is_empty() {
            return Err(MemeError::Validation("Please enter a custom location.".to_string()));
        }
        custom
    } else {
        selected.trim()
    };

    if label.is_empty() {
        return Err(MemeError::Validation("Please enter a location.".to_string()));
    }
    Ok(label.to_string())
}
