use docsift_core::{DocumentKind, ExtractionResult};

use crate::csv::{render_tables_csv, render_text_csv, ExportError};
use crate::summary::{to_pretty_json, ArtifactSummary, UploadResponse};

/// File names of one upload's artifacts, optionally inside a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    dir: Option<String>,
    pub csv: String,
    pub json: String,
}

impl ArtifactNames {
    /// `<stem>_tables.csv` for PDFs, `<stem>.csv` for images; `<stem>_output.json` for both.
    pub fn for_upload(kind: DocumentKind, stem: &str) -> Self {
        let csv = match kind {
            DocumentKind::Pdf => format!("{stem}_tables.csv"),
            DocumentKind::Image => format!("{stem}.csv"),
        };
        Self { dir: None, csv, json: format!("{stem}_output.json") }
    }

    pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    fn reference(&self, name: &str) -> String {
        match &self.dir {
            Some(dir) => format!("{dir}/{name}"),
            None => name.to_string(),
        }
    }

    pub fn csv_ref(&self) -> String {
        self.reference(&self.csv)
    }

    pub fn json_ref(&self) -> String {
        self.reference(&self.json)
    }
}

/// Everything that gets written and returned for one upload.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub names: ArtifactNames,
    pub csv: Vec<u8>,
    pub summary_json: Vec<u8>,
    pub response: UploadResponse,
}

impl ArtifactBundle {
    pub fn build(result: &ExtractionResult, names: ArtifactNames) -> Result<Self, ExportError> {
        let csv = match result.kind {
            DocumentKind::Pdf => render_tables_csv(&result.tables)?,
            DocumentKind::Image => render_text_csv(&result.text)?,
        };
        let summary = ArtifactSummary { text: result.text.clone(), csv: names.csv_ref() };
        let summary_json = to_pretty_json(&summary)?;
        let response = UploadResponse {
            text: result.text.clone(),
            csv: names.csv_ref(),
            json: names.json_ref(),
        };
        Ok(Self { names, csv, summary_json, response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_core::{EngineOutcome, Table};

    #[test]
    fn names_follow_document_kind() {
        let pdf = ArtifactNames::for_upload(DocumentKind::Pdf, "report");
        assert_eq!((pdf.csv.as_str(), pdf.json.as_str()), ("report_tables.csv", "report_output.json"));

        let img = ArtifactNames::for_upload(DocumentKind::Image, "scan").in_dir("1234");
        assert_eq!(img.csv, "scan.csv");
        assert_eq!(img.csv_ref(), "1234/scan.csv");
        assert_eq!(img.json_ref(), "1234/scan_output.json");
    }

    #[test]
    fn pdf_bundle_uses_tables() {
        let text = "--- Engine B ---\nPage1\n\n--- Engine C ---\nPage1 text".to_string();
        let ok = EngineOutcome::Extracted(String::new());
        let result = ExtractionResult::assemble(
            DocumentKind::Pdf,
            text.clone(),
            vec![Table::from_rows([["a", "b"], ["c", "d"]])],
            &[("Engine B", &ok), ("Engine C", &ok)],
        );
        let names = ArtifactNames::for_upload(DocumentKind::Pdf, "report").in_dir("req");
        let bundle = ArtifactBundle::build(&result, names).unwrap();

        assert_eq!(bundle.csv, b"a,b\nc,d\n\n");
        assert_eq!(
            bundle.response,
            UploadResponse { text: text.clone(), csv: "req/report_tables.csv".into(), json: "req/report_output.json".into() }
        );
        let summary: ArtifactSummary = serde_json::from_slice(&bundle.summary_json).unwrap();
        assert_eq!(summary, ArtifactSummary { text, csv: "req/report_tables.csv".into() });
    }

    #[test]
    fn image_bundle_uses_text_csv() {
        let result = ExtractionResult::from_image("ocr", &EngineOutcome::Extracted("Hello, world".into()));
        let bundle =
            ArtifactBundle::build(&result, ArtifactNames::for_upload(DocumentKind::Image, "scan")).unwrap();
        assert_eq!(String::from_utf8(bundle.csv).unwrap(), "text\n\"Hello, world\"\n");
        assert_eq!(bundle.response.csv, "scan.csv");
    }

    #[test]
    fn pdf_without_tables_has_empty_csv() {
        let ok = EngineOutcome::Extracted(String::new());
        let result = ExtractionResult::assemble(
            DocumentKind::Pdf,
            "No text extracted from the PDF.".into(),
            Vec::new(),
            &[("Engine B", &ok)],
        );
        let bundle =
            ArtifactBundle::build(&result, ArtifactNames::for_upload(DocumentKind::Pdf, "blank")).unwrap();
        assert!(bundle.csv.is_empty());
    }
}
