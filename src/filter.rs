use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;

use crate::record::{AgeBracket, AnimalRecord, CatalogSnapshot};

/// Sentinel selector value matching every record.
pub const TOUS: &str = "Tous";

/// Shown in place of a photo cell that does not resolve to a fetchable URL.
pub const PLACEHOLDER_PHOTO: &str = "https://placehold.co/320x240?text=Photo+a+venir";

/// Display badge for the free-text status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Urgent,
    Reserved,
    Adopted,
    Available,
}

impl StatusClass {
    pub fn label(&self) -> &'static str {
        match self {
            StatusClass::Urgent => "Urgence",
            StatusClass::Reserved => "Réservé",
            StatusClass::Adopted => "Adopté",
            StatusClass::Available => "Disponible",
        }
    }
}

/// Classify a status cell by first matching substring. Order matters:
/// urgency wins over any other marker in the same cell.
pub fn status_class(status: &str) -> StatusClass {
    if status.contains("Urgence") {
        StatusClass::Urgent
    } else if status.contains("Réservé") {
        StatusClass::Reserved
    } else if status.contains("Adopté") {
        StatusClass::Adopted
    } else {
        StatusClass::Available
    }
}

/// Species selector options: "Tous" followed by the sorted distinct species
/// present in the snapshot.
pub fn species_options(snapshot: &CatalogSnapshot) -> Vec<String> {
    let mut options = vec![TOUS.to_string()];
    options.extend(
        snapshot
            .records()
            .iter()
            .filter_map(|r| r.species.as_deref())
            .map(str::to_string)
            .sorted()
            .dedup(),
    );
    options
}

/// Age selector options: "Tous" followed by the bracket labels observed in
/// the snapshot, in bracket order.
pub fn bracket_options(snapshot: &CatalogSnapshot) -> Vec<String> {
    let mut options = vec![TOUS.to_string()];
    for bracket in AgeBracket::ALL {
        if snapshot.records().iter().any(|r| r.age_bracket == bracket) {
            options.push(bracket.label().to_string());
        }
    }
    options
}

/// Select the visible records. A record passes when every non-"Tous"
/// selector matches exactly; order follows the snapshot. Pure: the snapshot
/// is only borrowed.
pub fn filter_records<'a>(
    snapshot: &'a CatalogSnapshot,
    species_sel: &str,
    bracket_sel: &str,
) -> Vec<&'a AnimalRecord> {
    snapshot
        .records()
        .iter()
        .filter(|r| species_sel == TOUS || r.species.as_deref() == Some(species_sel))
        .filter(|r| bracket_sel == TOUS || r.age_bracket.label() == bracket_sel)
        .collect()
}

/// Photo URL as it should be displayed. File-hosting share links carrying a
/// "/d/<id>" segment are rewritten to the host's direct-view form; anything
/// else that looks like an HTTP URL passes through; the rest falls back to
/// the placeholder.
pub fn photo_display_url(photo: &str) -> String {
    static SHARE_RE: OnceLock<Regex> = OnceLock::new();
    let re = SHARE_RE.get_or_init(|| {
        Regex::new(r"^https?://([^/?#]+)/(?:[^?#]*/)?d/([A-Za-z0-9_-]+)(?:[/?#]|$)").unwrap()
    });

    let photo = photo.trim();
    if let Some(caps) = re.captures(photo) {
        return format!("https://{}/uc?export=view&id={}", &caps[1], &caps[2]);
    }
    if photo.starts_with("http://") || photo.starts_with("https://") {
        return photo.to_string();
    }
    PLACEHOLDER_PHOTO.to_string()
}
