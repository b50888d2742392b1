//! Codec gzip sobre `flate2`

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

/// Comprime un buffer completo en memoria
pub fn compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data)?;
    // `finish` escribe el trailer (CRC32 + tamaño); si falla el stream no es válido
    encoder.finish()
}

/// Descomprime un stream gzip completo.
///
/// Varios miembros concatenados se descomprimen en orden (RFC 1952, 2.2).
/// Cada miembro valida su trailer: un stream truncado falla con
/// `UnexpectedEof` y uno con checksum incorrecto con `InvalidInput`. Bytes
/// sobrantes que no forman un header gzip válido también son error.
pub fn decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 2);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
