use crc32fast::Hasher as Crc32Hasher;
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryHeader {
    pub magic: [u8; 8],
    pub version: u16,
    pub flags: u16,
    pub reserved: u32,
    pub header_crc32: u32,
}

impl BinaryHeader {
    pub const LEN_WITHOUT_CRC: usize = 8 + 2 + 2 + 4;
    pub const TOTAL_LEN: usize = Self::LEN_WITHOUT_CRC + 4;

    pub fn new(magic: [u8; 8], version: u16, flags: u16) -> Self {
        let mut header = Self {
            magic,
            version,
            flags,
            reserved: 0,
            header_crc32: 0,
        };
        header.header_crc32 = header.compute_crc32();
        header
    }

    fn compute_crc32(&self) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(&self.magic);
        hasher.update(&self.version.to_le_bytes());
        hasher.update(&self.flags.to_le_bytes());
        hasher.update(&self.reserved.to_le_bytes());
        hasher.finalize()
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        w.write_all(&self.magic)?;
        w.write_all(&self.version.to_le_bytes())?;
        w.write_all(&self.flags.to_le_bytes())?;
        w.write_all(&self.reserved.to_le_bytes())?;
        w.write_all(&self.header_crc32.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut r: R) -> std::io::Result<Self> {
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic)?;

        let mut v = [0u8; 2];
        r.read_exact(&mut v)?;
        let version = u16::from_le_bytes(v);

        let mut f = [0u8; 2];
        r.read_exact(&mut f)?;
        let flags = u16::from_le_bytes(f);

        let mut res = [0u8; 4];
        r.read_exact(&mut res)?;
        let reserved = u32::from_le_bytes(res);

        let mut c = [0u8; 4];
        r.read_exact(&mut c)?;
        let header_crc32 = u32::from_le_bytes(c);

        let hdr = Self {
            magic,
            version,
            flags,
            reserved,
            header_crc32,
        };
        if hdr.compute_crc32() != header_crc32 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "header CRC mismatch",
            ));
        }
        Ok(hdr)
    }

    /// Reads a header and checks it carries the expected file kind and version.
    pub fn read_expecting<R: Read>(r: R, kind: FileKind, version: u16) -> std::io::Result<Self> {
        let header = Self::read_from(r)?;
        if header.magic != kind.magic() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "invalid magic",
            ));
        }
        if header.version != version {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unsupported version {}", header.version),
            ));
        }
        Ok(header)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    ColumnarFrame,
    ColumnarManifest,
}

impl FileKind {
    pub const fn magic(&self) -> [u8; 8] {
        match self {
            FileKind::ColumnarFrame => *b"SLCRFRM\0",
            FileKind::ColumnarManifest => *b"SLCRMAN\0",
        }
    }
}
