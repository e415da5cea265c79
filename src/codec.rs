use crate::constants::{BYTE_WINDOW, SIZE_WINDOW};

pub fn pack_byte(value: u8, window: &mut [u8]) {
    debug_assert_eq!(window.len(), BYTE_WINDOW);

    for (i, byte) in window.iter_mut().enumerate() {
        *byte = (*byte & !1) | ((value >> i) & 1);
    }
}

pub fn unpack_byte(window: &[u8]) -> u8 {
    debug_assert_eq!(window.len(), BYTE_WINDOW);

    window
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &byte)| acc | ((byte & 1) << i))
}

pub fn pack_size(value: u32, window: &mut [u8]) {
    debug_assert_eq!(window.len(), SIZE_WINDOW);

    for (i, byte) in window.iter_mut().enumerate() {
        *byte = (*byte & !1) | (((value >> i) & 1) as u8);
    }
}

pub fn unpack_size(window: &[u8]) -> u32 {
    debug_assert_eq!(window.len(), SIZE_WINDOW);

    window
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &byte)| acc | (((byte & 1) as u32) << i))
}
