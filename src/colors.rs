/// RGB for a CAD color index. Covers the named base colors and the grayscale
/// band; any other index returns `None` and the renderer falls back to black
/// with a warning.
pub fn rgb_for_index(index: i32) -> Option<[u8; 3]> {
    match index {
        0 => Some([0, 0, 0]),
        1 => Some([255, 0, 0]),
        2 => Some([255, 255, 0]),
        3 => Some([0, 255, 0]),
        4 => Some([0, 255, 255]),
        5 => Some([0, 0, 255]),
        6 => Some([255, 0, 255]),
        7 => Some([255, 255, 255]),
        8 => Some([65, 65, 65]),
        9 => Some([128, 128, 128]),
        250..=255 => {
            let level = [51, 91, 132, 172, 213, 255][(index - 250) as usize];
            Some([level, level, level])
        }
        _ => None,
    }
}
