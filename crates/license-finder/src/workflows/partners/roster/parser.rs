use std::collections::BTreeMap;
use std::io::Read;

use crate::workflows::partners::sanitize::{is_visibly_blank, normalize_url};

/// Rows read from one upload; the rest are ignored.
pub const MAX_ROSTER_ROWS: usize = 200;
/// Links column entries kept per row.
pub const MAX_LINKS_PER_ROW: usize = 10;

const NAME_ALIASES: &[&str] = &["name", "company", "company name", "candidate", "brand"];
const WEBSITE_ALIASES: &[&str] = &[
    "website",
    "url",
    "site",
    "homepage",
    "company url",
    "company website",
    "web",
];
const NOTES_ALIASES: &[&str] = &[
    "notes",
    "note",
    "description",
    "comments",
    "comment",
    "details",
    "info",
];
const LINKS_ALIASES: &[&str] = &[
    "links",
    "link",
    "source",
    "sources",
    "evidence",
    "references",
    "reference",
];

/// One candidate row from an uploaded roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub name: String,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub links: Vec<String>,
    /// Non-empty cells from unrecognised columns, keyed by original header.
    pub custom_data: BTreeMap<String, String>,
}

impl RosterRow {
    /// Website plus links, normalised and de-duplicated in first-seen order.
    pub fn evidence_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        let website = self.website.as_deref().and_then(normalize_url);
        let links = self
            .links
            .iter()
            .take(MAX_LINKS_PER_ROW)
            .filter_map(|link| normalize_url(link));
        for url in website.into_iter().chain(links) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read roster csv: {0}")]
    Csv(#[from] csv::Error),
}

struct ColumnMap {
    name: usize,
    website: Option<usize>,
    notes: Option<usize>,
    links: Option<usize>,
    extras: Vec<(usize, String)>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let lowered: Vec<String> = headers
            .iter()
            .map(|header| header.trim().to_lowercase())
            .collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| lowered.iter().position(|header| header == alias))
        };

        let name = find(NAME_ALIASES).unwrap_or(0);
        let website = find(WEBSITE_ALIASES);
        let notes = find(NOTES_ALIASES);
        let links = find(LINKS_ALIASES);

        let known = [Some(name), website, notes, links];
        let extras = headers
            .iter()
            .enumerate()
            .filter(|(index, _)| !known.contains(&Some(*index)))
            .map(|(index, header)| (index, header.trim().to_string()))
            .collect();

        Self {
            name,
            website,
            notes,
            links,
            extras,
        }
    }

    fn row(&self, record: &csv::StringRecord) -> RosterRow {
        let cell = |index: Option<usize>| {
            index
                .and_then(|index| record.get(index))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let links = cell(self.links)
            .map(|raw| {
                raw.split(|ch: char| ch == ';' || ch.is_whitespace())
                    .filter(|link| !link.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let custom_data = self
            .extras
            .iter()
            .filter_map(|(index, header)| {
                cell(Some(*index)).map(|value| (header.clone(), value))
            })
            .collect();

        RosterRow {
            name: cell(Some(self.name)).unwrap_or_default(),
            website: cell(self.website),
            notes: cell(self.notes),
            links,
            custom_data,
        }
    }
}

/// Parse a roster with flexible, case-insensitive header aliases.
///
/// The name column falls back to the first column when no alias matches. Rows whose name is
/// blank (zero-width characters included) are dropped.
pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<RosterRow>, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Ok(Vec::new());
    }
    let columns = ColumnMap::from_headers(&headers);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let row = columns.row(&record?);
        if is_visibly_blank(&row.name) {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_aliases_and_collects_extras() {
        let csv = "Company Name,Homepage,Description,Sources,Region\n\
                   MiiR,www.miir.com,Premium drinkware,https://a.example/1;https://a.example/2,PNW\n";
        let rows = parse_roster(csv.as_bytes()).expect("parse");

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "MiiR");
        assert_eq!(row.website.as_deref(), Some("www.miir.com"));
        assert_eq!(row.notes.as_deref(), Some("Premium drinkware"));
        assert_eq!(row.links, vec!["https://a.example/1", "https://a.example/2"]);
        assert_eq!(row.custom_data.get("Region").map(String::as_str), Some("PNW"));
    }

    #[test]
    fn falls_back_to_first_column_for_names() {
        let csv = "Partner,Notes\nSnow Peak,Outdoor lifestyle\n";
        let rows = parse_roster(csv.as_bytes()).expect("parse");
        assert_eq!(rows[0].name, "Snow Peak");
        assert!(rows[0].custom_data.is_empty());
    }

    #[test]
    fn drops_blank_and_zero_width_names() {
        let csv = "name,website\n,https://blank.example\n\u{200B},https://zw.example\nStojo,stojo.co\n";
        let rows = parse_roster(csv.as_bytes()).expect("parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Stojo");
    }

    #[test]
    fn supports_quoted_fields_and_ragged_rows() {
        let csv = "name,notes,links\n\"Sea to Summit, Inc.\",\"Accessories, \"\"dry bags\"\"\"\nW&P\n";
        let rows = parse_roster(csv.as_bytes()).expect("parse");
        assert_eq!(rows[0].name, "Sea to Summit, Inc.");
        assert_eq!(rows[0].notes.as_deref(), Some("Accessories, \"dry bags\""));
        assert_eq!(rows[1].name, "W&P");
        assert!(rows[1].links.is_empty());
    }

    #[test]
    fn evidence_urls_are_normalised_and_deduplicated() {
        let row = RosterRow {
            name: "GSI Outdoors".to_string(),
            website: Some("gsioutdoors.com".to_string()),
            notes: None,
            links: vec![
                "https://gsioutdoors.com/".to_string(),
                "ftp://nope.example".to_string(),
                "gsioutdoors.com/press".to_string(),
            ],
            custom_data: BTreeMap::new(),
        };
        assert_eq!(
            row.evidence_urls(),
            vec!["https://gsioutdoors.com/", "https://gsioutdoors.com/press"]
        );
    }

    #[test]
    fn caps_links_per_row() {
        let row = RosterRow {
            name: "OXO".to_string(),
            website: None,
            notes: None,
            links: (0..15).map(|index| format!("https://oxo.example/{index}")).collect(),
            custom_data: BTreeMap::new(),
        };
        assert_eq!(row.evidence_urls().len(), MAX_LINKS_PER_ROW);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse_roster("".as_bytes()).expect("parse").is_empty());
    }
}
