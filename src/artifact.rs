//! `.prd` artifact container: serialized pre-fitted scaler and model
//!
//! Both artifacts are produced by an external training process and are
//! opaque to the predict pipeline, which only sees them through the
//! `Transform`/`Predict` traits. This module owns the one place where the
//! container format is understood.
//!
//! ## Format (32-byte header + JSON payload)
//!
//! ```text
//! [0..4]   Magic: "PRD1"
//! [4]      Version major
//! [5]      Version minor
//! [6..8]   Artifact kind (u16 LE): 1 = standard scaler, 2 = linear regressor
//! [8..12]  Payload length (u32 LE)
//! [12..16] Payload CRC32 (IEEE polynomial)
//! [16..32] Reserved (zero)
//! [32..]   JSON payload
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactRole, PredecirError, Result};

/// Magic bytes identifying a `.prd` artifact
pub const MAGIC: [u8; 4] = *b"PRD1";

/// Header size in bytes
pub const HEADER_SIZE: usize = 32;

/// Current format version
pub const FORMAT_VERSION: (u8, u8) = (1, 0);

/// CRC32 checksum (IEEE polynomial 0xEDB88320)
fn crc32(data: &[u8]) -> u32 {
    const TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        let idx = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = TABLE[idx] ^ (crc >> 8);
    }
    !crc
}

/// What kind of fitted object an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Feature scaler (mean/scale normalization)
    StandardScaler,
    /// Linear regression model (coefficients + intercept)
    LinearRegressor,
}

impl ArtifactKind {
    /// Wire value in the header
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::StandardScaler => 1,
            Self::LinearRegressor => 2,
        }
    }

    /// Parse the wire value
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::StandardScaler),
            2 => Some(Self::LinearRegressor),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StandardScaler => write!(f, "standard scaler"),
            Self::LinearRegressor => write!(f, "linear regressor"),
        }
    }
}

/// Fitted scaler state: per-feature mean and scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Mean of each feature, in positional order
    pub mean: Vec<f64>,
    /// Scale (standard deviation) of each feature, in positional order
    pub scale: Vec<f64>,
}

/// Fitted regression state: coefficients and intercept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorParams {
    /// One coefficient per feature, in positional order
    pub coefficients: Vec<f64>,
    /// Additive intercept
    pub intercept: f64,
}

/// Parsed `.prd` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactHeader {
    /// Format version (major, minor)
    pub version: (u8, u8),
    /// Kind of fitted object the payload holds
    pub kind: ArtifactKind,
    /// Payload length in bytes
    pub payload_len: u32,
    /// CRC32 of the payload
    pub checksum: u32,
}

impl ArtifactHeader {
    /// Parse and validate the 32-byte header.
    ///
    /// # Errors
    ///
    /// Returns the failure reason as a plain string; callers wrap it into
    /// [`PredecirError::LoadFailure`] with role and path attached.
    pub fn from_bytes(data: &[u8]) -> std::result::Result<Self, String> {
        if data.len() < HEADER_SIZE {
            return Err(format!(
                "artifact too small: {} bytes (need at least {HEADER_SIZE})",
                data.len()
            ));
        }
        if data[0..4] != MAGIC {
            return Err(format!(
                "bad magic: expected {:?}, got {:?}",
                MAGIC,
                &data[0..4]
            ));
        }
        let version = (data[4], data[5]);
        if version.0 != FORMAT_VERSION.0 {
            return Err(format!(
                "unsupported format version {}.{} (supported: {}.x)",
                version.0, version.1, FORMAT_VERSION.0
            ));
        }
        let kind_raw = u16::from_le_bytes([data[6], data[7]]);
        let kind = ArtifactKind::from_u16(kind_raw)
            .ok_or_else(|| format!("unknown artifact kind: {kind_raw}"))?;
        let payload_len = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);
        let checksum = u32::from_le_bytes([data[12], data[13], data[14], data[15]]);

        Ok(Self {
            version,
            kind,
            payload_len,
            checksum,
        })
    }
}

/// Encode a payload into the `.prd` container.
fn encode(kind: ArtifactKind, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0u8; HEADER_SIZE];
    bytes[0..4].copy_from_slice(&MAGIC);
    bytes[4] = FORMAT_VERSION.0;
    bytes[5] = FORMAT_VERSION.1;
    bytes[6..8].copy_from_slice(&kind.as_u16().to_le_bytes());
    bytes[8..12].copy_from_slice(&u32::try_from(payload.len()).unwrap_or(u32::MAX).to_le_bytes());
    bytes[12..16].copy_from_slice(&crc32(payload).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Validate header, payload length and checksum, returning the header and
/// the payload slice. Kind-agnostic; used by `inspect` and by [`decode`].
pub fn verify(data: &[u8]) -> std::result::Result<(ArtifactHeader, &[u8]), String> {
    let header = ArtifactHeader::from_bytes(data)?;
    let payload_end = HEADER_SIZE + header.payload_len as usize;
    if data.len() < payload_end {
        return Err(format!(
            "truncated payload: header declares {} bytes, file has {}",
            header.payload_len,
            data.len() - HEADER_SIZE
        ));
    }
    let payload = &data[HEADER_SIZE..payload_end];
    let actual = crc32(payload);
    if actual != header.checksum {
        return Err(format!(
            "payload checksum mismatch: expected {:#010x}, got {actual:#010x}",
            header.checksum
        ));
    }
    Ok((header, payload))
}

/// Validate and return the payload, additionally requiring the right kind.
fn decode(data: &[u8], expected: ArtifactKind) -> std::result::Result<&[u8], String> {
    let (header, payload) = verify(data)?;
    if header.kind != expected {
        return Err(format!(
            "artifact kind mismatch: expected {expected}, got {}",
            header.kind
        ));
    }
    Ok(payload)
}

/// Serialize scaler parameters into a `.prd` artifact.
///
/// # Errors
///
/// Returns [`PredecirError::InvalidConfiguration`] if the parameters cannot
/// be serialized.
pub fn encode_scaler(params: &ScalerParams) -> Result<Vec<u8>> {
    let payload =
        serde_json::to_vec(params).map_err(|e| PredecirError::InvalidConfiguration {
            reason: format!("failed to serialize scaler params: {e}"),
        })?;
    Ok(encode(ArtifactKind::StandardScaler, &payload))
}

/// Serialize regressor parameters into a `.prd` artifact.
///
/// # Errors
///
/// Returns [`PredecirError::InvalidConfiguration`] if the parameters cannot
/// be serialized.
pub fn encode_regressor(params: &RegressorParams) -> Result<Vec<u8>> {
    let payload =
        serde_json::to_vec(params).map_err(|e| PredecirError::InvalidConfiguration {
            reason: format!("failed to serialize regressor params: {e}"),
        })?;
    Ok(encode(ArtifactKind::LinearRegressor, &payload))
}

fn load_failure(role: ArtifactRole, path: &Path, reason: String) -> PredecirError {
    PredecirError::LoadFailure {
        role,
        path: path.to_path_buf(),
        reason,
    }
}

/// Decode scaler parameters from raw artifact bytes.
///
/// # Errors
///
/// [`PredecirError::LoadFailure`] with the exact cause (magic, version,
/// kind, checksum or JSON) attached to `path`.
pub fn decode_scaler(data: &[u8], path: &Path) -> Result<ScalerParams> {
    let role = ArtifactRole::Scaler;
    let payload =
        decode(data, ArtifactKind::StandardScaler).map_err(|r| load_failure(role, path, r))?;
    serde_json::from_slice(payload)
        .map_err(|e| load_failure(role, path, format!("invalid scaler payload: {e}")))
}

/// Decode regressor parameters from raw artifact bytes.
///
/// # Errors
///
/// [`PredecirError::LoadFailure`] with the exact cause attached to `path`.
pub fn decode_regressor(data: &[u8], path: &Path) -> Result<RegressorParams> {
    let role = ArtifactRole::Model;
    let payload =
        decode(data, ArtifactKind::LinearRegressor).map_err(|r| load_failure(role, path, r))?;
    serde_json::from_slice(payload)
        .map_err(|e| load_failure(role, path, format!("invalid regressor payload: {e}")))
}
