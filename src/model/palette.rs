//! Deterministic color and emoji assignment.
//!
//! Groups and keywords get stable visual identities from a djb2 hash of
//! their text, so the same collection renders identically across reloads.

/// 20 visually distinct light colors for group cards.
pub const GROUP_COLORS: [(u8, u8, u8); 20] = [
  (0xFF, 0xEB, 0x99),
  (0xB2, 0xF7, 0xEF),
  (0xFF, 0xD6, 0xE0),
  (0xD0, 0xF4, 0xDE),
  (0xF6, 0xDF, 0xEB),
  (0xE4, 0xC1, 0xF9),
  (0xC1, 0xF9, 0xE4),
  (0xF9, 0xF7, 0xC1),
  (0xF9, 0xE4, 0xC1),
  (0xC1, 0xD6, 0xF9),
  (0xF9, 0xC1, 0xC1),
  (0xC1, 0xF9, 0xF6),
  (0xF6, 0xF9, 0xC1),
  (0xC1, 0xF6, 0xF9),
  (0xF9, 0xC1, 0xE4),
  (0xE4, 0xF9, 0xC1),
  (0xC1, 0xE4, 0xF9),
  (0xF9, 0xC1, 0xD6),
  (0xD6, 0xF9, 0xC1),
  (0xC1, 0xF9, 0xD6),
];

/// 30 visually distinct emojis for keywords.
pub const KEYWORD_EMOJIS: [&str; 30] = [
  "🌟", "🔥", "💡", "🎯", "🚀", "✨", "🧠", "📌", "🔑", "🎉", "📝", "📚", "💎", "🧩", "🎵",
  "🎬", "🎮", "📷", "🌈", "🍀", "🍕", "🍔", "🍦", "🍩", "🍉", "🍎", "🍓", "🍒", "🍇", "🍊",
];

/// djb2 over UTF-16 code units, 32-bit wrapping, absolute value.
fn hash_text(text: &str) -> u32 {
  let mut hash: i32 = 5381;
  for unit in text.encode_utf16() {
    hash = hash
      .wrapping_shl(5)
      .wrapping_add(hash)
      .wrapping_add(unit as i32);
  }
  hash.unsigned_abs()
}

/// Assign a palette index to each group name, in render order.
///
/// Each name hashes to a preferred slot; a slot already taken this render
/// probes linearly to the next free one (wrapping), bounded by palette size,
/// so no two visible groups share a color while free slots remain. With more
/// groups than palette entries, repeats fall back to the hashed slot.
pub fn assign_group_colors<'a>(names: impl Iterator<Item = &'a str>) -> Vec<usize> {
  let mut used = [false; GROUP_COLORS.len()];
  names
    .map(|name| {
      let mut idx = hash_text(name) as usize % GROUP_COLORS.len();
      let mut tries = 0;
      while used[idx] && tries < GROUP_COLORS.len() {
        idx = (idx + 1) % GROUP_COLORS.len();
        tries += 1;
      }
      used[idx] = true;
      idx
    })
    .collect()
}

/// Emoji for a keyword. No collision avoidance; repeats are fine.
pub fn keyword_emoji(text: &str) -> &'static str {
  KEYWORD_EMOJIS[hash_text(text) as usize % KEYWORD_EMOJIS.len()]
}

/// Darken a color by the given fraction, for dark-theme rendering.
pub fn darken(color: (u8, u8, u8), amount: f32) -> (u8, u8, u8) {
  let scale = |c: u8| (c as f32 * (1.0 - amount)) as u8;
  (scale(color.0), scale(color.1), scale(color.2))
}
