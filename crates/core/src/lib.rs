pub mod archive;
pub mod batch;
pub mod config;
pub mod metrics;
pub mod render;
pub mod role;
pub mod roster;
pub mod testing;

pub use archive::{ArchiveJob, ArchiveManifest, Archiver, PackagingError, ZipArchiver};
pub use batch::{
    package_pending, render_single, BatchError, BatchPhase, BatchResult, BatchRunner, BatchTally,
    FailureKind, RecordFailure, SingleCardError,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    ResolvedConfig, SanitizedConfig,
};
pub use render::{CardRenderer, GeneratedDocument, PdfCardRenderer, RenderError, RenderJob};
pub use role::{classify, Role, RoleMapping};
pub use roster::{
    suggest_column_mapping, AttendeeRecord, ColumnMapping, NoInputFileError,
    RecordValidationError, RosterError, RosterReader,
};
