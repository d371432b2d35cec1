//! Key name to Android keycode mappings

use phf::phf_map;

/// Common key names mapped to Android keycode numbers
pub static KEYCODES: phf::Map<&'static str, u32> = phf_map! {
    "HOME" => 3,
    "BACK" => 4,
    "CALL" => 5,
    "ENDCALL" => 6,
    "VOLUME_UP" => 24,
    "VOLUME_DOWN" => 25,
    "POWER" => 26,
    "CAMERA" => 27,
    "TAB" => 61,
    "SPACE" => 62,
    "ENTER" => 66,
    "DEL" => 67,
    "DELETE" => 67,
    "MENU" => 82,
    "SEARCH" => 84,
    "MEDIA_PLAY_PAUSE" => 85,
    "PAGE_UP" => 92,
    "PAGE_DOWN" => 93,
    "MOVE_END" => 123,
    "ESC" => 111,
    "ESCAPE" => 111,
    "APP_SWITCH" => 187,
};

/// Resolve a key given by name or raw keycode number
pub fn resolve_keycode(key: &str) -> Option<u32> {
    if let Ok(code) = key.parse::<u32>() {
        return Some(code);
    }
    KEYCODES.get(key.to_uppercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_name() {
        assert_eq!(resolve_keycode("BACK"), Some(4));
        assert_eq!(resolve_keycode("back"), Some(4));
        assert_eq!(resolve_keycode("Enter"), Some(66));
    }

    #[test]
    fn test_resolve_by_number() {
        assert_eq!(resolve_keycode("26"), Some(26));
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(resolve_keycode("NOT_A_KEY"), None);
    }
}
