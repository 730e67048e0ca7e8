//! `stage.type.key=value` assignments and `stage.type` targets from the
//! command line.

use std::str::FromStr;

use degrada_core::StageSlot;

/// A malformed command-line target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// A `--set` value without three dotted parts and an `=`.
    #[error("expected STAGE.TYPE.KEY=VALUE, got {0:?}")]
    Assignment(String),

    /// A `--disable` value that is not `STAGE.TYPE`.
    #[error("expected STAGE.TYPE, got {0:?}")]
    Entry(String),

    /// A stage id other than the three pipeline stages.
    #[error("unknown stage {0:?} (use stage1, stage2 or stage3)")]
    Stage(String),
}

fn slot(raw: &str) -> Result<StageSlot, TargetError> {
    StageSlot::from_id(raw)
        .filter(|s| *s != StageSlot::Single)
        .ok_or_else(|| TargetError::Stage(raw.to_owned()))
}

/// `--disable stage1.noise`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTarget {
    pub stage: StageSlot,
    pub type_key: String,
}

impl FromStr for EntryTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (stage, type_key) = s
            .split_once('.')
            .filter(|(_, t)| !t.is_empty() && !t.contains('.'))
            .ok_or_else(|| TargetError::Entry(s.to_owned()))?;
        Ok(Self {
            stage: slot(stage)?,
            type_key: type_key.to_owned(),
        })
    }
}

/// `--set stage1.blur.sigma=2.5`
///
/// The value stays raw; it goes through the same parsing and clamping as
/// a slider in the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub stage: StageSlot,
    pub type_key: String,
    pub param_key: String,
    pub raw: String,
}

impl FromStr for Assignment {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TargetError::Assignment(s.to_owned());
        let (path, raw) = s.split_once('=').ok_or_else(malformed)?;
        let mut parts = path.split('.');
        let (Some(stage), Some(type_key), Some(param_key), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        if type_key.is_empty() || param_key.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            stage: slot(stage)?,
            type_key: type_key.to_owned(),
            param_key: param_key.to_owned(),
            raw: raw.trim().to_owned(),
        })
    }
}
