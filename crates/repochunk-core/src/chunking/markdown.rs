//! Markdown header-hierarchy splitter

use std::collections::BTreeMap;

/// Header values in effect for a section, keyed `Header 1` .. `Header N`
pub type HeaderPath = BTreeMap<String, String>;

/// A run of markdown content under one header path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSection {
    pub content: String,
    pub headers: HeaderPath,
}

/// Metadata key for a header level
pub fn header_key(level: usize) -> String {
    format!("Header {}", level)
}

/// Splits markdown on `#` headers up to `max_level`
///
/// Header lines are removed from the content and recorded in the header
/// path instead. Lines inside fenced code blocks are never headers.
pub struct MarkdownHeaderSplitter {
    max_level: usize,
}

impl MarkdownHeaderSplitter {
    pub fn new(max_level: usize) -> Self {
        Self { max_level }
    }

    /// Header level of a line, if it is a header this splitter tracks
    fn header_level(&self, line: &str) -> Option<usize> {
        let hashes = line.chars().take_while(|c| *c == '#').count();
        if hashes == 0 || hashes > self.max_level {
            return None;
        }
        match line[hashes..].chars().next() {
            None | Some(' ') => Some(hashes),
            Some(_) => None,
        }
    }

    pub fn split_text(&self, text: &str) -> Vec<HeaderSection> {
        let mut runs: Vec<HeaderSection> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut levels: Vec<usize> = Vec::new();
        let mut active = HeaderPath::new();
        let mut path = HeaderPath::new();
        let mut fence: Option<&'static str> = None;

        let mut flush = |current: &mut Vec<String>, headers: &HeaderPath| {
            if !current.is_empty() {
                runs.push(HeaderSection {
                    content: current.join("\n"),
                    headers: headers.clone(),
                });
                current.clear();
            }
        };

        for raw in text.split('\n') {
            let line: String = raw.trim().chars().filter(|c| !c.is_control()).collect();

            match fence {
                None if line.starts_with("```") && line.matches("```").count() == 1 => {
                    fence = Some("```")
                }
                None if line.starts_with("~~~") => fence = Some("~~~"),
                Some(open) if line.starts_with(open) => fence = None,
                _ => {}
            }
            if fence.is_some() {
                current.push(line);
                continue;
            }

            if let Some(level) = self.header_level(&line) {
                while let Some(&top) = levels.last() {
                    if top < level {
                        break;
                    }
                    levels.pop();
                    active.remove(&header_key(top));
                }
                active.insert(header_key(level), line[level..].trim().to_string());
                levels.push(level);
                flush(&mut current, &path);
            } else if !line.is_empty() {
                current.push(line);
            } else {
                flush(&mut current, &path);
            }

            path = active.clone();
        }
        flush(&mut current, &path);

        aggregate(runs)
    }
}

/// Join consecutive runs that share a header path
fn aggregate(runs: Vec<HeaderSection>) -> Vec<HeaderSection> {
    let mut sections: Vec<HeaderSection> = Vec::new();
    for run in runs {
        match sections.last_mut() {
            Some(last) if last.headers == run.headers => {
                last.content.push_str("  \n");
                last.content.push_str(&run.content);
            }
            _ => sections.push(run),
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(entries: &[(usize, &str)]) -> HeaderPath {
        entries
            .iter()
            .map(|(level, value)| (header_key(*level), value.to_string()))
            .collect()
    }

    #[test]
    fn test_single_header_paragraph() {
        let sections = MarkdownHeaderSplitter::new(4).split_text("# Title\n\nShort paragraph.");
        assert_eq!(
            sections,
            vec![HeaderSection {
                content: "Short paragraph.".to_string(),
                headers: path(&[(1, "Title")]),
            }]
        );
    }

    #[test]
    fn test_header_path_tracks_nearest_headers() {
        let doc = "# A\nintro\n## B\nb body\n### C\nc body\n## D\nd body\n# E\ne body";
        let sections = MarkdownHeaderSplitter::new(4).split_text(doc);
        let paths: Vec<HeaderPath> = sections.iter().map(|s| s.headers.clone()).collect();
        assert_eq!(
            paths,
            vec![
                path(&[(1, "A")]),
                path(&[(1, "A"), (2, "B")]),
                path(&[(1, "A"), (2, "B"), (3, "C")]),
                path(&[(1, "A"), (2, "D")]),
                path(&[(1, "E")]),
            ]
        );
        assert_eq!(sections[3].content, "d body");
    }

    #[test]
    fn test_paragraphs_under_same_header_aggregate() {
        let doc = "## Usage\nfirst line\n\nsecond para";
        let sections = MarkdownHeaderSplitter::new(4).split_text(doc);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "first line  \nsecond para");
    }

    #[test]
    fn test_content_before_first_header() {
        let doc = "preamble\n# Title\nbody";
        let sections = MarkdownHeaderSplitter::new(4).split_text(doc);
        assert_eq!(sections[0].content, "preamble");
        assert!(sections[0].headers.is_empty());
        assert_eq!(sections[1].headers, path(&[(1, "Title")]));
    }

    #[test]
    fn test_code_fence_hides_headers() {
        let doc = "# Setup\n```bash\n# not a header\n\nrun\n```\nafter";
        let sections = MarkdownHeaderSplitter::new(4).split_text(doc);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].content.contains("# not a header"));
        assert!(sections[0].content.ends_with("after"));
        assert_eq!(sections[0].headers, path(&[(1, "Setup")]));
    }

    #[test]
    fn test_deep_and_malformed_headers_are_content() {
        let doc = "# Top\n##### five\n#hashtag";
        let sections = MarkdownHeaderSplitter::new(4).split_text(doc);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "##### five\n#hashtag");
    }

    #[test]
    fn test_headers_only_yields_nothing() {
        assert!(MarkdownHeaderSplitter::new(4).split_text("# A\n## B\n").is_empty());
    }
}
