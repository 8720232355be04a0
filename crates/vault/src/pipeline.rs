//! Retrieval-and-write pipeline.
//!
//! Iterates the correlated descriptors in order, one object at a time:
//! fetch, write, log. The first failure aborts the remaining descriptors —
//! a workload mount either fully materializes or the run fails — but files
//! already written stay on disk (rewriting identical content on a later
//! attempt is harmless).

use std::path::Path;

use tracing::info;

use crate::client::VaultClient;
use crate::error::VaultError;
use crate::objects::ObjectDescriptor;

/// Mode for every written object file: owner read/write, group/other read.
const FILE_MODE: u32 = 0o644;

/// Fetch every descriptor's content and write it under `target_dir`.
pub async fn materialize(
    client: &VaultClient,
    descriptors: &[ObjectDescriptor],
    target_dir: &Path,
) -> Result<(), VaultError> {
    for descriptor in descriptors {
        info!(
            kind = %descriptor.kind,
            name = %descriptor.name,
            version = %descriptor.version_label(),
            "retrieving vault object"
        );

        let content = client
            .fetch(descriptor)
            .await
            .map_err(|source| VaultError::Retrieval {
                kind: descriptor.kind,
                name: descriptor.name.clone(),
                version: descriptor.version_label().to_string(),
                source,
            })?;

        let path = target_dir.join(descriptor.file_name());
        write_object(&path, &content)
            .await
            .map_err(|source| VaultError::Write {
                kind: descriptor.kind,
                name: descriptor.name.clone(),
                path: path.clone(),
                source,
            })?;

        info!(
            kind = %descriptor.kind,
            name = %descriptor.name,
            path = %path.display(),
            "wrote vault object"
        );
    }
    Ok(())
}

async fn write_object(path: &Path, content: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(path, content).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(FILE_MODE)).await?;
    }
    Ok(())
}
