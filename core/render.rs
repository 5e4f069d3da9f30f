use crate::gather::FileRecord;

pub const START_MARKER: &str = "// Start File: ";
pub const END_MARKER: &str = "// End File: ";

// Section layout:
//
//   // Start File: <path>
//
//   <trimmed content>
//
//   // End File: <path>
//
pub fn render_bundle(records: &[FileRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(START_MARKER);
        out.push_str(&record.path);
        out.push_str("\n\n");
        out.push_str(record.content.trim());
        out.push_str("\n\n");
        out.push_str(END_MARKER);
        out.push_str(&record.path);
        out.push_str("\n\n");
    }
    log::debug!("Rendered {} files into {} bytes", records.len(), out.len());
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSection {
    pub path: String,
    pub content: String,
}

// A section runs from its start marker to the first end marker naming the
// same path. Text outside sections and unterminated sections are ignored.
pub fn split_sections(text: &str) -> Vec<BundleSection> {
    let mut sections = Vec::new();
    let mut current: Option<(&str, Vec<&str>)> = None;

    for line in text.split('\n') {
        match current.as_mut() {
            None => {
                if let Some(path) = line.strip_prefix(START_MARKER) {
                    current = Some((path, Vec::new()));
                }
            }
            Some((path, body)) => {
                if line.strip_prefix(END_MARKER) == Some(*path) {
                    sections.push(BundleSection {
                        path: path.to_string(),
                        content: body.join("\n").trim().to_string(),
                    });
                    current = None;
                } else {
                    body.push(line);
                }
            }
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, content: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            content: content.to_string(),
            package_name: String::new(),
            internal_imports: Vec::new(),
        }
    }

    #[test]
    fn renders_markers_and_trimmed_content() {
        let rendered = render_bundle(&[record("pkg/a/a.go", "\n\npackage a\n\n\n")]);
        assert_eq!(
            rendered,
            "// Start File: pkg/a/a.go\n\npackage a\n\n// End File: pkg/a/a.go\n\n"
        );
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render_bundle(&[]), "");
    }

    #[test]
    fn sections_round_trip() {
        let records = vec![
            record("README.md", "  # Title\n\nBody text.\n"),
            record("empty.sql", "   \n"),
            record("web/app.tsx", "export const x = 1;\r\nexport const y = 2;\r\n"),
        ];
        let sections = split_sections(&render_bundle(&records));
        assert_eq!(sections.len(), records.len());
        for (section, record) in sections.iter().zip(&records) {
            assert_eq!(section.path, record.path);
            assert_eq!(section.content, record.content.trim());
        }
    }

    #[test]
    fn end_marker_for_another_path_stays_in_content() {
        let records = vec![record("a.md", "// End File: b.md\ntext")];
        let sections = split_sections(&render_bundle(&records));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "// End File: b.md\ntext");
    }

    #[test]
    fn unterminated_section_is_dropped() {
        assert!(split_sections("// Start File: x.go\n\npackage x\n").is_empty());
    }
}
