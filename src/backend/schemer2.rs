//! Schemer2 backend

use std::path::Path;

use super::command::CandidateCommand;
use super::{
    parse_hex_colors, slice, sort_by_yiq, to_output, Backend, BackendContext, BackendError,
    BackendOutput, BackendResult, Extraction, SEED_BACKGROUND_DARKEN,
};
use crate::colour::Color;

pub const ID: &str = "schemer2";

pub struct Schemer2Backend {
    command: CandidateCommand,
}

impl Default for Schemer2Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl Schemer2Backend {
    pub fn new() -> Self {
        Self::with_command(CandidateCommand::new("schemer2"))
    }

    pub fn with_command(command: CandidateCommand) -> Self {
        Self { command }
    }
}

impl Backend for Schemer2Backend {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "schemer2 image colour extraction"
    }

    fn extract(&self, image: &Path, context: &BackendContext) -> BackendResult<Extraction> {
        if !self.command.is_available() {
            return Err(BackendError::missing_dependency(ID, "schemer2"));
        }

        let args = vec![
            "-format".to_string(),
            "img::colors".to_string(),
            "-minBright".to_string(),
            "75".to_string(),
            "-in".to_string(),
            image.to_string_lossy().into_owned(),
        ];
        let output = self
            .command
            .run(&context.runner, &args)
            .map_err(|e| BackendError::from_command(ID, "schemer2", e))?;

        Ok(Extraction::complete(parse_hex_colors(&output)))
    }

    /// Sorted by YIQ, the brighter half doubled, slot 0 a darkened copy of
    /// the darkest colour
    fn normalize(&self, raw: &[Color]) -> BackendResult<BackendOutput> {
        let mut sorted = raw.to_vec();
        sort_by_yiq(&mut sorted);
        let darkest = sorted
            .first()
            .copied()
            .ok_or_else(|| BackendError::extraction_failed(ID, "no colours extracted"))?;

        let upper = slice(&sorted, 8, sorted.len());
        let mut slots = [upper, upper].concat();
        match slots.first_mut() {
            Some(first) => *first = darkest.darken(SEED_BACKGROUND_DARKEN),
            None => slots.push(darkest.darken(SEED_BACKGROUND_DARKEN)),
        }
        to_output(ID, &slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey(level: u8) -> Color {
        Color::new(level, level, level)
    }

    #[test]
    fn test_normalize_uses_upper_half_twice() {
        // Reverse order so the backend has to sort
        let raw: Vec<Color> = (0..16u8).rev().map(|i| grey(i * 10 + 20)).collect();
        let output = Schemer2Backend::new().normalize(&raw).unwrap();

        assert!(!output.degraded);
        assert_eq!(output.palette[0], grey(20).darken(SEED_BACKGROUND_DARKEN));
        assert_eq!(output.palette[1], grey(110));
        assert_eq!(output.palette[7], grey(170));
        assert_eq!(output.palette[8], grey(100));
        assert_eq!(output.palette[15], grey(170));
    }

    #[test]
    fn test_normalize_short_output_is_degraded() {
        let raw = vec![grey(10), grey(200)];
        let output = Schemer2Backend::new().normalize(&raw).unwrap();
        assert!(output.degraded);
        assert_eq!(output.palette[0], grey(10).darken(SEED_BACKGROUND_DARKEN));
    }

    #[test]
    fn test_missing_binary() {
        let backend = Schemer2Backend::with_command(CandidateCommand::new("walgen-no-such-schemer2"));
        let error = backend
            .extract(Path::new("wall.png"), &BackendContext::default())
            .unwrap_err();
        assert!(matches!(error, BackendError::MissingDependency { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_parses_tool_output() {
        let backend = Schemer2Backend::with_command(CandidateCommand::with_prefix(
            "sh",
            &["-c", "printf '#102030\\n#A0B0C0\\n'", "schemer2"],
        ));
        let extraction = backend
            .extract(Path::new("wall.png"), &BackendContext::default())
            .unwrap();
        assert_eq!(
            extraction.colors,
            vec![Color::new(0x10, 0x20, 0x30), Color::new(0xa0, 0xb0, 0xc0)]
        );
    }
}
