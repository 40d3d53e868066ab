//! okthief backend
//!
//! okthief prints a JSON list whose first two entries are its lightest and
//! darkest picks, followed by the accents.

use std::path::Path;

use serde::Deserialize;

use super::command::CandidateCommand;
use super::{
    to_output, Backend, BackendContext, BackendError, BackendOutput, BackendResult, Extraction,
    SEED_BACKGROUND_DARKEN,
};
use crate::colour::Color;

pub const ID: &str = "okthief";

/// Colours requested from okthief
pub const REQUESTED_COLORS: usize = 8;

#[derive(Debug, Deserialize)]
struct OkthiefColor {
    hex: String,
}

/// Parse okthief's JSON output into colours, preserving order
pub fn parse_output(output: &str) -> BackendResult<Vec<Color>> {
    let entries: Vec<OkthiefColor> = serde_json::from_str(output)
        .map_err(|e| BackendError::extraction_failed(ID, format!("unexpected output: {}", e)))?;
    entries
        .iter()
        .map(|entry| Color::from_hex(&entry.hex).map_err(|_| BackendError::invalid_color(&entry.hex)))
        .collect()
}

pub struct OkthiefBackend {
    command: CandidateCommand,
}

impl Default for OkthiefBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OkthiefBackend {
    pub fn new() -> Self {
        Self::with_command(CandidateCommand::new("okthief"))
    }

    pub fn with_command(command: CandidateCommand) -> Self {
        Self { command }
    }
}

impl Backend for OkthiefBackend {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "okthief perceptual (Oklab) palette extraction"
    }

    fn extract(&self, image: &Path, context: &BackendContext) -> BackendResult<Extraction> {
        if !self.command.is_available() {
            return Err(BackendError::missing_dependency(ID, "okthief"));
        }

        let args = vec![
            "--num-colors".to_string(),
            REQUESTED_COLORS.to_string(),
            "--file".to_string(),
            image.to_string_lossy().into_owned(),
        ];
        let output = self
            .command
            .run(&context.runner, &args)
            .map_err(|e| BackendError::from_command(ID, "okthief", e))?;

        Ok(Extraction::complete(parse_output(&output)?))
    }

    /// `[black, accents.., white]` twice, slot 0 darkened
    fn normalize(&self, raw: &[Color]) -> BackendResult<BackendOutput> {
        let mut ordered = Vec::with_capacity(raw.len());
        match raw {
            [] => {}
            [only] => ordered.push(*only),
            [white, black, rest @ ..] => {
                ordered.push(*black);
                ordered.extend_from_slice(rest);
                ordered.push(*white);
            }
        }

        let mut slots = [ordered.as_slice(), ordered.as_slice()].concat();
        if let Some(first) = slots.first_mut() {
            *first = first.darken(SEED_BACKGROUND_DARKEN);
        }
        to_output(ID, &slots)
    }
}
