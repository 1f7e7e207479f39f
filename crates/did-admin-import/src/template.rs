//! Fixed CSV layouts: downloadable upload templates and the DialB import
//! header contract.

use std::fmt;
use std::str::FromStr;

use crate::csv::write_row;
use crate::error::{ImportError, Result};

/// Headers a DialB import file must carry, in export order.
pub const DIALB_HEADERS: [&str; 7] = [
    "Phone Number",
    "Group",
    "Overall Status",
    "T-Mobile",
    "AT&T",
    "3rd Party",
    "Last Checked",
];

/// A downloadable upload template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// DID upload template.
    Dids,
    /// Area-code upload template.
    AreaCodes,
}

impl Template {
    /// Column headers.
    #[must_use]
    pub const fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Dids => &["Phone Number", "Area Code", "Status", "Provider", "Assigned Date"],
            Self::AreaCodes => &["Code", "Region", "State", "Timezone"],
        }
    }

    /// One example data row.
    #[must_use]
    pub const fn sample(self) -> &'static [&'static str] {
        match self {
            Self::Dids => &["+1-555-123-4567", "555", "active", "Provider A", "2024-01-15"],
            Self::AreaCodes => &["555", "Sample Region", "CA", "PST"],
        }
    }

    /// Suggested download file name.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Dids => "dids_template.csv",
            Self::AreaCodes => "areacodes_template.csv",
        }
    }

    /// Header line plus sample line.
    #[must_use]
    pub fn to_csv(self) -> String {
        format!("{}\n{}\n", write_row(self.headers()), write_row(self.sample()))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dids => "dids",
            Self::AreaCodes => "areacodes",
        })
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dids" => Ok(Self::Dids),
            "areacodes" => Ok(Self::AreaCodes),
            other => Err(format!("unknown template type: {other}")),
        }
    }
}

/// Check that every `expected` header appears in `found` (trimmed, exact).
///
/// # Errors
///
/// Returns [`ImportError::HeaderMismatch`] listing the absent headers.
pub fn require_headers<S: AsRef<str>>(found: &[S], expected: &[&str]) -> Result<()> {
    let missing: Vec<String> = expected
        .iter()
        .filter(|e| !found.iter().any(|f| f.as_ref().trim() == **e))
        .map(ToString::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::HeaderMismatch { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse_rows;

    #[test]
    fn dids_template_content() {
        assert_eq!(
            Template::Dids.to_csv(),
            "Phone Number,Area Code,Status,Provider,Assigned Date\n+1-555-123-4567,555,active,Provider A,2024-01-15\n"
        );
    }

    #[test]
    fn templates_parse_back_to_two_rows() {
        for template in [Template::Dids, Template::AreaCodes] {
            let rows = parse_rows(&template.to_csv());
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].len(), template.headers().len());
        }
    }

    #[test]
    fn template_names() {
        assert_eq!("areacodes".parse::<Template>().unwrap(), Template::AreaCodes);
        assert!("companies".parse::<Template>().is_err());
        assert_eq!(Template::Dids.to_string(), "dids");
    }

    #[test]
    fn header_contract() {
        assert!(require_headers(&DIALB_HEADERS[..], &DIALB_HEADERS).is_ok());

        let found = ["Phone Number", "Group", "Overall Status"];
        let err = require_headers(&found[..], &DIALB_HEADERS).unwrap_err();
        assert_eq!(
            err,
            ImportError::HeaderMismatch {
                missing: vec![
                    "T-Mobile".to_string(),
                    "AT&T".to_string(),
                    "3rd Party".to_string(),
                    "Last Checked".to_string(),
                ]
            }
        );
    }
}
