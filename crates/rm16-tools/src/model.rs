use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use rm16::disasm::disassemble;
use rm16::memory::{image_from_le_bytes, image_to_le_bytes};

/// A raw machine-code image: one 32-bit little-endian word per address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub base: u16,
    pub words: Vec<u32>,
}

pub fn load_raw_bin(path: &Path, base: u16, skip: usize, len: Option<usize>) -> Result<Image> {
    let words = image_from_le_bytes(&std::fs::read(path)?)?;
    anyhow::ensure!(skip <= words.len(), "--skip exceeds image size");
    let mut payload = &words[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining image size after skip");
        payload = &payload[..lim];
    }
    Ok(Image { base, words: payload.to_vec() })
}

pub fn save_raw_bin(path: &Path, img: &Image) -> Result<()> {
    std::fs::write(path, image_to_le_bytes(&img.words))?;
    Ok(())
}

pub fn read_word(img: &Image, addr: u16) -> Option<u32> {
    let off = addr.wrapping_sub(img.base) as usize;
    img.words.get(off).copied()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingLine {
    pub addr: u16,
    pub raw: u32,
    pub text: String,
}

/// Disassemble `count` addresses from `start`, wrapping past 0xFFFF.
/// Addresses outside the image are skipped.
pub fn listing(img: &Image, start: u16, count: usize) -> Vec<ListingLine> {
    (0..count.min(0x1_0000))
        .filter_map(|i| {
            let addr = start.wrapping_add(i as u16);
            let raw = read_word(img, addr)?;
            Some(ListingLine { addr, raw, text: disassemble(raw) })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_maps_skip_and_len() {
        let dir = std::env::temp_dir();
        let path = dir.join("_rm16_test_image.bin");
        let img = Image { base: 0, words: vec![0x4000_0005, 0x5000_0003, 0x6500_0000, 0x2600_0000] };
        save_raw_bin(&path, &img).unwrap();

        let loaded = load_raw_bin(&path, 0x8000, 1, Some(2)).unwrap();
        assert_eq!(loaded.base, 0x8000);
        assert_eq!(loaded.words, vec![0x5000_0003, 0x6500_0000]);
        assert_eq!(read_word(&loaded, 0x8001), Some(0x6500_0000));
        assert!(read_word(&loaded, 0x8002).is_none());
        assert!(read_word(&loaded, 0x7FFF).is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn listing_renders_assembler_syntax() {
        let img = Image { base: 0x8000, words: vec![0x4000_0005, 0x6500_0000, 0x0000_0000] };
        let lines = listing(&img, 0x8000, 4);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "RI MOV A, 0x0005");
        assert_eq!(lines[1].text, "RI HLT A, 0x0000");
        assert_eq!(lines[2].text, "RR MOV A, A, A");
    }

    #[test]
    fn listing_reaches_the_last_address() {
        let img = Image { base: 0xFFFF, words: vec![0x4000_0005] };
        let lines = listing(&img, img.base, img.words.len());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].addr, 0xFFFF);
        assert_eq!(lines[0].text, "RI MOV A, 0x0005");
    }

    #[test]
    fn loader_rejects_partial_words() {
        let path = std::env::temp_dir().join("_rm16_test_partial.bin");
        std::fs::write(&path, [1u8, 2, 3, 4, 5]).unwrap();
        assert!(load_raw_bin(&path, 0, 0, None).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
