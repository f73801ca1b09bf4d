//! Xcode project descriptor object model
//!
//! A `project.pbxproj` file is a semi-structured text format with no public
//! schema. It freely mixes `()` and `{}` to group sub-elements, so no
//! off-the-shelf parser applies. Objects are instead treated as opaque text
//! fragments: the parser splits the file into its fifteen fixed sections and,
//! within each section, into brace-balanced object blocks. Editors locate
//! known anchor substrings inside those blocks to perform targeted edits, and
//! the writer re-emits every untouched block byte for byte.

use std::path::Path;

/// The fifteen top-level sections of a project descriptor, in file order.
///
/// `Header` and `Footer` are boilerplate blobs without internal structure;
/// every other section holds a sequence of brace-balanced objects delimited
/// by `/* Begin X section */` and `/* End X section */` marker lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Header,
    BuildFile,
    ContainerItemProxy,
    CopyFilesBuildPhase,
    FileReference,
    FrameworksBuildPhase,
    Group,
    NativeTarget,
    Project,
    ReferenceProxy,
    ResourcesBuildPhase,
    SourcesBuildPhase,
    BuildConfiguration,
    ConfigurationList,
    Footer,
}

impl Section {
    /// Number of sections in a descriptor.
    pub const COUNT: usize = 15;

    /// All sections in their fixed file order.
    pub const ALL: [Section; Section::COUNT] = [
        Section::Header,
        Section::BuildFile,
        Section::ContainerItemProxy,
        Section::CopyFilesBuildPhase,
        Section::FileReference,
        Section::FrameworksBuildPhase,
        Section::Group,
        Section::NativeTarget,
        Section::Project,
        Section::ReferenceProxy,
        Section::ResourcesBuildPhase,
        Section::SourcesBuildPhase,
        Section::BuildConfiguration,
        Section::ConfigurationList,
        Section::Footer,
    ];

    /// The literal token naming this section in its marker lines.
    pub fn marker_name(self) -> &'static str {
        match self {
            Section::Header => "PBXHeader",
            Section::BuildFile => "PBXBuildFile",
            Section::ContainerItemProxy => "PBXContainerItemProxy",
            Section::CopyFilesBuildPhase => "PBXCopyFilesBuildPhase",
            Section::FileReference => "PBXFileReference",
            Section::FrameworksBuildPhase => "PBXFrameworksBuildPhase",
            Section::Group => "PBXGroup",
            Section::NativeTarget => "PBXNativeTarget",
            Section::Project => "PBXProject",
            Section::ReferenceProxy => "PBXReferenceProxy",
            Section::ResourcesBuildPhase => "PBXResourcesBuildPhase",
            Section::SourcesBuildPhase => "PBXSourcesBuildPhase",
            Section::BuildConfiguration => "XCBuildConfiguration",
            Section::ConfigurationList => "XCConfigurationList",
            Section::Footer => "PBXFooter",
        }
    }

    /// The section following this one in file order, if any.
    pub fn next(self) -> Option<Section> {
        Section::ALL.get(self.index() + 1).copied()
    }

    /// Position of this section in the fixed order.
    pub fn index(self) -> usize {
        Section::ALL
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    /// Whether this section is an unstructured boilerplate blob.
    pub fn is_boilerplate(self) -> bool {
        matches!(self, Section::Header | Section::Footer)
    }

    fn begin_marker(self) -> String {
        format!("/* Begin {} section */", self.marker_name())
    }

    fn end_marker(self) -> String {
        format!("/* End {} section */", self.marker_name())
    }
}

/// Error types for descriptor parsing
#[derive(Debug, thiserror::Error)]
pub enum PbxError {
    #[error("unbalanced braces in project descriptor at line {line}")]
    UnbalancedBraces { line: usize },

    #[error("failed to read project descriptor: {0}")]
    Io(#[from] std::io::Error),
}

/// Parsed in-memory form of a project descriptor.
///
/// Created once per build by parsing the staged template, mutated in place
/// by the assembler, and written once at the end. Section order is fixed;
/// the header and footer hold exactly one accumulated blob each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbxproj {
    sections: [Vec<String>; Section::COUNT],
}

/// Parser state for one section of the descriptor.
///
/// The walk over the section sequence is an explicit state machine: the
/// current section selects the accumulation rule, and marker lines drive
/// the transitions.
#[derive(Debug)]
struct ParseState {
    /// Section currently being accumulated
    section: Section,
    /// Pending object text, if any
    accum: Option<String>,
    /// Running `{`/`}` balance within the pending object
    balance: i32,
    /// Set once the section's end marker has flushed a trailing fragment;
    /// stray lines are then ignored until the next begin marker
    trailing: bool,
}

impl Pbxproj {
    fn empty() -> Self {
        Self {
            sections: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// The objects stored in one section.
    pub fn section(&self, section: Section) -> &[String] {
        &self.sections[section.index()]
    }

    /// Mutable access to one section's object list.
    pub fn section_mut(&mut self, section: Section) -> &mut Vec<String> {
        &mut self.sections[section.index()]
    }

    /// Parse descriptor text into its component objects.
    ///
    /// The input is assumed to originate from the known template; the only
    /// corruption class detected is an unbalanced brace nesting.
    pub fn parse(text: &str) -> Result<Pbxproj, PbxError> {
        let mut pbx = Pbxproj::empty();
        let mut state = ParseState {
            section: Section::Header,
            accum: None,
            balance: 0,
            trailing: false,
        };

        for (number, line) in text.split_inclusive('\n').enumerate() {
            let next = state.section.next();
            let advance = next.is_some_and(|n| line.contains(&n.begin_marker()));
            let complete = line.contains(&state.section.end_marker());

            if advance || (complete && next == Some(Section::Footer)) {
                // Transition: flush whatever is pending and move on. The
                // marker line itself is consumed; the writer regenerates it.
                if let Some(obj) = state.accum.take() {
                    pbx.sections[state.section.index()].push(obj);
                }
                if let Some(n) = next {
                    state.section = n;
                }
                state.balance = 0;
                state.trailing = false;
            } else if state.section.is_boilerplate() {
                append(&mut state.accum, line);
            } else if complete {
                // End marker with a fragment still pending: flush it and
                // ignore stray padding until the next begin marker.
                if let Some(obj) = state.accum.take() {
                    if obj != "\n" {
                        pbx.sections[state.section.index()].push(obj);
                        state.trailing = true;
                    }
                }
            } else if !state.trailing {
                state.balance += brace_parity(line);
                if state.balance < 0 {
                    return Err(PbxError::UnbalancedBraces { line: number + 1 });
                }
                append(&mut state.accum, line);
                if state.balance == 0 {
                    if let Some(obj) = state.accum.take() {
                        if obj != "\n" {
                            pbx.sections[state.section.index()].push(obj);
                        }
                    }
                }
            }
        }

        // Whatever is still pending at end of input (normally the footer)
        if let Some(obj) = state.accum.take() {
            pbx.sections[state.section.index()].push(obj);
        }

        Ok(pbx)
    }

    /// Parse the descriptor file inside a project bundle directory.
    pub fn parse_file(path: &Path) -> Result<Pbxproj, PbxError> {
        let text = std::fs::read_to_string(path)?;
        Pbxproj::parse(&text)
    }

    /// Recollate the objects back into descriptor text.
    ///
    /// Sections appear in their fixed order, each non-boilerplate one
    /// wrapped in freshly generated marker lines and followed by one blank
    /// line. Object text is emitted exactly as stored.
    pub fn write(&self) -> String {
        let mut out = String::new();
        for section in Section::ALL {
            if !section.is_boilerplate() {
                out.push_str(&section.begin_marker());
                out.push('\n');
            }
            for obj in self.section(section) {
                out.push_str(obj);
            }
            if !section.is_boilerplate() {
                out.push_str(&section.end_marker());
                out.push('\n');
                // The footer blob follows its marker directly; a blank line
                // here would accrete into the footer on the next parse.
                if section.next() != Some(Section::Footer) {
                    out.push('\n');
                }
            }
        }
        out
    }

    /// Serialize the descriptor to a file.
    pub fn write_to(&self, path: &Path) -> Result<(), PbxError> {
        std::fs::write(path, self.write())?;
        Ok(())
    }
}

fn append(accum: &mut Option<String>, line: &str) {
    match accum {
        Some(text) => text.push_str(line),
        None => *accum = Some(line.to_string()),
    }
}

/// Net `{`/`}` count of one line of descriptor text.
pub fn brace_parity(line: &str) -> i32 {
    let mut parity = 0;
    for c in line.chars() {
        match c {
            '{' => parity += 1,
            '}' => parity -= 1,
            _ => {}
        }
    }
    parity
}

/// Splice new entries into a parenthesized list field of an object.
///
/// Locates the `<field> = (` declaration inside the object text and inserts
/// the entries, each on its own line one level deeper than the declaration,
/// immediately after that line and before any existing list content.
/// Objects lacking the field are returned unchanged; some objects
/// legitimately omit optional fields.
pub fn insert_entries(obj: &str, field: &str, entries: &[String]) -> String {
    let decl = format!("{field} = (");
    let Some(start) = obj.find(&decl) else {
        return obj.to_string();
    };
    let Some(eol) = obj[start..].find('\n').map(|p| start + p) else {
        return obj.to_string();
    };

    const INDENT: &str = "\n\t\t\t\t";
    let mut spliced = String::with_capacity(obj.len() + entries.len() * 48);
    spliced.push_str(&obj[..eol]);
    for entry in entries {
        spliced.push_str(INDENT);
        spliced.push_str(entry);
    }
    spliced.push_str(&obj[eol..]);
    spliced
}
