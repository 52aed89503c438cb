use std::collections::HashMap;

use csv::StringRecord;
use thiserror::Error;

use crate::record::{parse_age, AgeBracket, AnimalRecord};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),
    /// The body was not the expected sheet at all (a private sheet's export
    /// URL answers with an HTML sign-in page, for instance).
    #[error("no known catalog column in the header row")]
    UnknownHeader,
}

const COL_NAME: &str = "Nom";
const COL_SPECIES: &str = "Espèce";
const COL_SEX: &str = "Sexe";
const COL_AGE: &str = "Âge";
const COL_STATUS: &str = "Statut";
const COL_PHOTO: &str = "Photo";
const COL_STORY: &str = "Histoire";
const COL_DESCRIPTION: &str = "Description";
const COL_ARRIVAL: &str = "Date_Entree";

const KNOWN_COLUMNS: [&str; 9] = [
    COL_NAME,
    COL_SPECIES,
    COL_SEX,
    COL_AGE,
    COL_STATUS,
    COL_PHOTO,
    COL_STORY,
    COL_DESCRIPTION,
    COL_ARRIVAL,
];

#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Drop rows with a blank name. Off by default: the sheet's blank rows
    /// still render as cards with empty fields.
    pub skip_unnamed: bool,
}

/// Decode the CSV export into typed records, in source row order.
///
/// Column presence is not guaranteed. Each expected column is resolved by
/// name once from the header row; a missing column yields the field's empty
/// default on every row rather than an error. Only a body with none of the
/// catalog columns, or a malformed CSV stream, is an error.
pub fn decode_catalog(
    csv_text: &str,
    opts: &DecodeOptions,
) -> Result<Vec<AnimalRecord>, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);
    if !KNOWN_COLUMNS.iter().any(|col| header_map.contains_key(*col)) {
        return Err(DecodeError::UnknownHeader);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let name = cell(&row, &header_map, COL_NAME).to_string();
        if opts.skip_unnamed && name.is_empty() {
            continue;
        }

        let species_raw = cell(&row, &header_map, COL_SPECIES);
        let age_raw = cell(&row, &header_map, COL_AGE).to_string();
        let age_years = parse_age(&age_raw);

        records.push(AnimalRecord {
            name,
            species: if species_raw.is_empty() {
                None
            } else {
                Some(species_raw.to_string())
            },
            sex: cell(&row, &header_map, COL_SEX).to_string(),
            age_raw,
            age_years,
            age_bracket: AgeBracket::from_age(age_years),
            status: cell(&row, &header_map, COL_STATUS).to_string(),
            photo: cell(&row, &header_map, COL_PHOTO).to_string(),
            story: cell(&row, &header_map, COL_STORY).to_string(),
            description: cell(&row, &header_map, COL_DESCRIPTION).to_string(),
            arrival_date: cell(&row, &header_map, COL_ARRIVAL).to_string(),
        });
    }
    Ok(records)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header(name), idx))
        .collect()
}

// Sheets exported from Excel may carry a BOM on the first header; without
// stripping it the "Nom" column would resolve as missing.
fn normalize_header(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn cell<'a>(row: &'a StringRecord, header_map: &HashMap<String, usize>, col: &str) -> &'a str {
    header_map
        .get(col)
        .and_then(|&idx| row.get(idx))
        .unwrap_or("")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Nom,Espèce,Sexe,Âge,Statut,Photo,Histoire,Description,Date_Entree
Rex,Chien,M,\"3,5\",Réservé,https://drive.example.com/file/d/ABC123/view?usp=sharing,Trouvé sur la route,Gentil avec les enfants,2024-03-01
Minou,Chat,F,11,Disponible,,,Calme,2023-11-15
";

    #[test]
    fn test_decode_basic() {
        let records = decode_catalog(CSV, &DecodeOptions::default()).unwrap();
        assert_eq!(records.len(), 2);

        let rex = &records[0];
        assert_eq!(rex.name, "Rex");
        assert_eq!(rex.species.as_deref(), Some("Chien"));
        assert_eq!(rex.age_years, Some(3.5));
        assert_eq!(rex.age_bracket, AgeBracket::JeuneAdulte);
        assert_eq!(rex.status, "Réservé");

        let minou = &records[1];
        assert_eq!(minou.age_bracket, AgeBracket::Senior);
        assert_eq!(minou.photo, "");
        assert_eq!(minou.story, "");
    }

    #[test]
    fn test_missing_columns_default() {
        let csv = "Nom,Âge\nRex,abc\n";
        let records = decode_catalog(csv, &DecodeOptions::default()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.species, None);
        assert_eq!(r.sex, "");
        assert_eq!(r.status, "");
        assert_eq!(r.age_years, None);
        assert_eq!(r.age_bracket, AgeBracket::Unspecified);
    }

    #[test]
    fn test_bom_on_first_header() {
        let csv = "\u{feff}Nom,Espèce\nRex,Chien\n";
        let records = decode_catalog(csv, &DecodeOptions::default()).unwrap();
        assert_eq!(records[0].name, "Rex");
    }

    #[test]
    fn test_blank_name_rows_kept_by_default() {
        let csv = "Nom,Espèce\n,Chien\nMinou,Chat\n";
        let records = decode_catalog(csv, &DecodeOptions::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "");
    }

    #[test]
    fn test_blank_name_rows_dropped_on_request() {
        let csv = "Nom,Espèce\n,Chien\nMinou,Chat\n";
        let opts = DecodeOptions { skip_unnamed: true };
        let records = decode_catalog(csv, &opts).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Minou");
    }

    #[test]
    fn test_source_order_preserved() {
        let csv = "Nom\nZoe\nAlba\nMax\n";
        let records = decode_catalog(csv, &DecodeOptions::default()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Zoe", "Alba", "Max"]);
    }

    #[test]
    fn test_html_body_is_an_error() {
        let body = "<html><head><title>Connexion</title></head><body>...</body></html>";
        assert!(matches!(
            decode_catalog(body, &DecodeOptions::default()),
            Err(DecodeError::UnknownHeader)
        ));
    }

    #[test]
    fn test_empty_body_is_an_error() {
        assert!(decode_catalog("", &DecodeOptions::default()).is_err());
    }
}
