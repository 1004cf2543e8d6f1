//! In-process codec for tests and embedding.

use std::fs;
use std::path::Path;

use crate::codec::{Extracted, ModelCodec};
use crate::error::{ModelError, ModelResult};

const MAGIC: &[u8; 4] = b"SMF1";

/// A codec for a trivial length-prefixed model container:
/// magic, then architecture/metadata/weights sections, each prefixed by its
/// u32-le length.
///
/// Exists so the store's model pipeline can be exercised without an external
/// tool; real deployments configure a [`CommandCodec`] instead.
///
/// [`CommandCodec`]: crate::command::CommandCodec
#[derive(Clone, Copy, Debug, Default)]
pub struct FramedCodec;

impl FramedCodec {
    /// Encode artifacts into the container format (the inverse of
    /// `extract`, as a byte buffer). Useful for fabricating model files in
    /// tests.
    pub fn encode(architecture: &[u8], metadata: &[u8], weights: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            MAGIC.len() + 12 + architecture.len() + metadata.len() + weights.len(),
        );
        out.extend_from_slice(MAGIC);
        for section in [architecture, metadata, weights] {
            out.extend_from_slice(&(section.len() as u32).to_le_bytes());
            out.extend_from_slice(section);
        }
        out
    }

    fn decode(data: &[u8], context: &Path) -> ModelResult<Extracted> {
        let malformed = |detail: &str| ModelError::Codec {
            context: context.display().to_string(),
            detail: detail.to_string(),
        };

        let rest = data
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| malformed("bad magic"))?;

        let mut sections = Vec::with_capacity(3);
        let mut cursor = rest;
        for _ in 0..3 {
            if cursor.len() < 4 {
                return Err(malformed("truncated section header"));
            }
            let len = u32::from_le_bytes([cursor[0], cursor[1], cursor[2], cursor[3]]) as usize;
            cursor = &cursor[4..];
            if cursor.len() < len {
                return Err(malformed("truncated section body"));
            }
            sections.push(cursor[..len].to_vec());
            cursor = &cursor[len..];
        }
        if !cursor.is_empty() {
            return Err(malformed("trailing bytes"));
        }

        let weights = sections.pop().expect("three sections pushed");
        let metadata = sections.pop().expect("three sections pushed");
        let architecture = sections.pop().expect("three sections pushed");
        Ok(Extracted {
            architecture,
            metadata,
            weights,
        })
    }
}

impl ModelCodec for FramedCodec {
    fn extract(&self, model_path: &Path) -> ModelResult<Extracted> {
        let data = fs::read(model_path)?;
        Self::decode(&data, model_path)
    }

    fn rebuild(
        &self,
        weights: &[u8],
        architecture: &[u8],
        metadata: &[u8],
        output_path: &Path,
    ) -> ModelResult<()> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, Self::encode(architecture, metadata, weights))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_rebuild_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.bin");
        let original = FramedCodec::encode(b"{\"arch\":1}", b"{\"meta\":2}", &[9u8; 4096]);
        fs::write(&model, &original).unwrap();

        let extracted = FramedCodec.extract(&model).unwrap();
        assert_eq!(extracted.architecture, b"{\"arch\":1}");
        assert_eq!(extracted.metadata, b"{\"meta\":2}");
        assert_eq!(extracted.weights, vec![9u8; 4096]);

        let rebuilt = dir.path().join("rebuilt.bin");
        FramedCodec
            .rebuild(
                &extracted.weights,
                &extracted.architecture,
                &extracted.metadata,
                &rebuilt,
            )
            .unwrap();
        assert_eq!(fs::read(&rebuilt).unwrap(), original);
    }

    #[test]
    fn malformed_container_is_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("junk.bin");
        fs::write(&model, b"not a model").unwrap();
        let err = FramedCodec.extract(&model).unwrap_err();
        assert!(matches!(err, ModelError::Codec { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FramedCodec
            .extract(Path::new("/nonexistent/model.bin"))
            .unwrap_err();
        assert!(matches!(err, ModelError::Io(_)));
    }
}
