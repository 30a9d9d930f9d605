//! Explicit parameter persistence.
//!
//! The whole model (configuration plus every learned projection and cell)
//! round-trips through bincode, so checkpointing is a plain byte interface
//! rather than an implicit module-tree traversal. Loading re-validates the
//! embedded configuration before handing the model back.

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::error::DrawError;
use crate::model::DrawModel;

impl DrawModel {
    /// Serialise all parameters and the configuration.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("model serialisation should not fail")
    }

    /// Restore a model from bytes produced by [`DrawModel::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DrawError> {
        let model: DrawModel =
            bincode::deserialize(bytes).map_err(|e| DrawError::Checkpoint(e.to_string()))?;
        model.config.validate()?;
        Ok(model)
    }

    /// Write a checkpoint file.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes())
            .with_context(|| format!("failed to write checkpoint to {}", path.display()))
    }

    /// Read a checkpoint file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read checkpoint from {}", path.display()))?;
        Ok(Self::from_bytes(&bytes)?)
    }
}
