//! Compile-command builders.
//!
//! Renders the fixed `CRTBND*` templates used to compile a source member
//! with debug views enabled. The templates are the only way the gateway
//! emits compile commands: caller input can only fill the object-name
//! fields, never the verb or directive structure, and the rendered string
//! still goes through [`crate::validate::validate`] with no exemption.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::names::object_name;

const COMPILE_TEXT: &str = "Compiled with debug view";

/// Program language a compile command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Language {
    Cl,
    Rpg,
    Cobol,
}

impl Language {
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Cl => "CRTBNDCL",
            Self::Rpg => "CRTBNDRPG",
            Self::Cobol => "CRTBNDCBL",
        }
    }

    /// The CL compiler has no event-file option.
    const fn emits_event_file(self) -> bool {
        !matches!(self, Self::Cl)
    }
}

/// One compile request: which member to compile and where the result
/// goes. Target library and program name fall back to the source library
/// and member name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompileRequest {
    pub language: Language,
    pub source_library: String,
    pub source_file: String,
    pub member: String,
    pub target_library: Option<String>,
    pub program_name: Option<String>,
}

impl CompileRequest {
    #[must_use]
    pub fn target_library(&self) -> &str {
        self.target_library.as_deref().unwrap_or(&self.source_library)
    }

    #[must_use]
    pub fn program_name(&self) -> &str {
        self.program_name.as_deref().unwrap_or(&self.member)
    }

    /// Render the compile command string.
    ///
    /// # Errors
    /// `Error::InvalidObjectName` when any field is not a valid system
    /// object name.
    pub fn render(&self) -> Result<String> {
        let target_lib = object_name("target_library", self.target_library())?;
        let pgm_name = object_name("program_name", self.program_name())?;
        let source_lib = object_name("source_library", &self.source_library)?;
        let source_file = object_name("source_file", &self.source_file)?;
        let member = object_name("member", &self.member)?;

        let mut command = format!(
            "{verb} PGM({target_lib}/{pgm_name}) SRCFILE({source_lib}/{source_file}) \
             SRCMBR({member}) DBGVIEW(*SOURCE)",
            verb = self.language.verb(),
        );
        if self.language.emits_event_file() {
            command.push_str(" OPTION(*EVENTF)");
        }
        command.push_str(&format!(" TEXT('{COMPILE_TEXT}')"));
        Ok(command)
    }
}
