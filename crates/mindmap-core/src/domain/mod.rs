//! Domain - ドメインモデル（木、アーティファクト、ファイル名、ストレージレコード、エラー）

pub mod tree;
pub mod artifact;
pub mod filename;
pub mod record;
pub mod errors;

pub use self::tree::{Features, MindmapNode, NodeKind, NodePayload, TransformResult};
pub use self::artifact::{Artifact, ArtifactMetadata, ARTIFACT_FORMAT, DEFAULT_TITLE};
pub use self::filename::{ArtifactFilename, DEFAULT_FILENAME, HTML_SUFFIX};
pub use self::record::{RemoteFile, StorageKind, StorageRecord};
pub use self::errors::{MindmapError, StoreError};
