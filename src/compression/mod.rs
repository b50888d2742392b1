//! # Compresión
//! src/compression/mod.rs
//!
//! Transformación de bytes sin estado detrás de dos operaciones,
//! `compress` y `decompress`. Las variantes son un conjunto cerrado elegido
//! por nombre con [`Codec::from_name`]:
//!
//! - `none`: identidad
//! - `gzip`: deflate con el formato gzip (RFC 1952)
//!
//! Para todo `x`, `decompress(compress(x)) == x`, incluido el vacío.

pub mod gzip;

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errores de compresión/descompresión
#[derive(Debug, Error)]
pub enum CompressionError {
    /// Nombre de codec desconocido (error de configuración)
    #[error("unknown codec '{0}' (expected 'gzip' or 'none')")]
    UnknownCodec(String),

    /// Stream malformado al descomprimir o fallo al cerrar el stream al comprimir
    #[error("{codec} stream error: {source}")]
    Stream {
        codec: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Codec disponible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    /// Identidad: los bytes pasan sin cambios
    None,

    /// gzip
    #[default]
    Gzip,
}

impl Codec {
    /// Construye un codec a partir de su nombre
    ///
    /// # Ejemplo
    /// ```
    /// use work_dispatcher::compression::Codec;
    ///
    /// assert_eq!(Codec::from_name("gzip").unwrap(), Codec::Gzip);
    /// assert!(Codec::from_name("zstd").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self, CompressionError> {
        match name.to_lowercase().as_str() {
            "gzip" => Ok(Codec::Gzip),
            "none" => Ok(Codec::None),
            _ => Err(CompressionError::UnknownCodec(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::None => "none",
            Codec::Gzip => "gzip",
        }
    }

    /// Comprime `data`
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        match self {
            Codec::None => Ok(data.to_vec()),
            Codec::Gzip => gzip::compress(data).map_err(|source| CompressionError::Stream {
                codec: "gzip",
                source,
            }),
        }
    }

    /// Descomprime `data`. Un stream truncado o corrupto es un error, nunca
    /// un resultado parcial.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        match self {
            Codec::None => Ok(data.to_vec()),
            Codec::Gzip => gzip::decompress(data).map_err(|source| CompressionError::Stream {
                codec: "gzip",
                source,
            }),
        }
    }
}

impl FromStr for Codec {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Codec::from_name(s)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Codec::from_name("gzip").unwrap(), Codec::Gzip);
        assert_eq!(Codec::from_name("GZIP").unwrap(), Codec::Gzip);
        assert_eq!(Codec::from_name("none").unwrap(), Codec::None);
    }

    #[test]
    fn test_unknown_codec_is_config_error() {
        let err = Codec::from_name("brotli").unwrap_err();
        assert!(matches!(err, CompressionError::UnknownCodec(ref n) if n == "brotli"));
        assert!(err.to_string().contains("brotli"));
    }

    #[test]
    fn test_from_str_and_display() {
        let codec: Codec = "gzip".parse().unwrap();
        assert_eq!(codec.to_string(), "gzip");
        assert!("lz4".parse::<Codec>().is_err());
    }

    #[test]
    fn test_identity_roundtrip() {
        let data = b"I will be compressed!";
        let out = Codec::None.compress(data).unwrap();
        assert_eq!(out, data);
        assert_eq!(Codec::None.decompress(&out).unwrap(), data);
    }

    #[test]
    fn test_gzip_roundtrip() {
        let data = b"I will be compressed!".repeat(50);
        let compressed = Codec::Gzip.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(Codec::Gzip.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_gzip_rejects_garbage() {
        let err = Codec::Gzip.decompress(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, CompressionError::Stream { codec: "gzip", .. }));
    }
}
