//! Read-only Windows registry enumeration for the launcher install keys.
//!
//! Off Windows every function yields an empty result rather than failing, so
//! the registry-backed platforms simply contribute nothing to a scan.

use std::collections::BTreeMap;

/// HKLM subpath holding one subkey per installed Ubisoft Connect title.
pub const UBISOFT_INSTALLS: &str = r"SOFTWARE\WOW6432Node\Ubisoft\Launcher\Installs";

/// HKLM subpath holding one subkey per installed GOG Galaxy title.
pub const GOG_GAMES: &str = r"SOFTWARE\WOW6432Node\GOG.com\Games";

/// Snapshot every subkey of `HKLM\{subpath}` together with its string values.
///
/// Each returned pair is `(subkey_name, values)`. Errors on individual keys
/// are skipped; an unreadable or absent parent key yields an empty list.
#[cfg(windows)]
pub fn enumerate_install_keys(subpath: &str) -> Vec<(String, BTreeMap<String, String>)> {
    win::enumerate_install_keys(subpath)
}

#[cfg(not(windows))]
pub fn enumerate_install_keys(_subpath: &str) -> Vec<(String, BTreeMap<String, String>)> {
    Vec::new()
}

#[cfg(windows)]
mod win {
    use std::collections::BTreeMap;

    use windows::Win32::Foundation::{ERROR_NO_MORE_ITEMS, ERROR_SUCCESS};
    use windows::Win32::System::Registry::{
        HKEY, HKEY_LOCAL_MACHINE, KEY_READ, REG_EXPAND_SZ, REG_SZ, REG_VALUE_TYPE, RegCloseKey,
        RegEnumKeyExW, RegEnumValueW, RegOpenKeyExW,
    };
    use windows::core::{PCWSTR, PWSTR};

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn from_wide(buf: &[u16]) -> String {
        let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        String::from_utf16_lossy(&buf[..end])
    }

    fn open_key(subpath: &str) -> Option<HKEY> {
        let wide = to_wide(subpath);
        let mut key = HKEY::default();
        let err =
            unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, PCWSTR(wide.as_ptr()), 0, KEY_READ, &mut key) };
        if err == ERROR_SUCCESS { Some(key) } else { None }
    }

    fn subkey_names(key: HKEY) -> Vec<String> {
        let mut names = Vec::new();
        let mut index = 0u32;
        loop {
            let mut name = [0u16; 256];
            let mut len = name.len() as u32;
            let err = unsafe {
                RegEnumKeyExW(
                    key,
                    index,
                    PWSTR(name.as_mut_ptr()),
                    &mut len,
                    None,
                    PWSTR::null(),
                    None,
                    None,
                )
            };
            if err == ERROR_NO_MORE_ITEMS || err != ERROR_SUCCESS {
                break;
            }
            names.push(from_wide(&name));
            index += 1;
        }
        names
    }

    fn string_values(key: HKEY) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        let mut index = 0u32;
        loop {
            let mut name = [0u16; 256];
            let mut name_len = name.len() as u32;
            let mut value_type = REG_VALUE_TYPE::default();
            let mut data = [0u8; 2048];
            let mut data_len = data.len() as u32;
            let err = unsafe {
                RegEnumValueW(
                    key,
                    index,
                    PWSTR(name.as_mut_ptr()),
                    &mut name_len,
                    None,
                    Some(&mut value_type),
                    Some(data.as_mut_ptr()),
                    Some(&mut data_len),
                )
            };
            if err == ERROR_NO_MORE_ITEMS || err != ERROR_SUCCESS {
                break;
            }
            if value_type == REG_SZ || value_type == REG_EXPAND_SZ {
                let wide: Vec<u16> = data[..data_len as usize]
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect();
                values.insert(from_wide(&name), from_wide(&wide));
            }
            index += 1;
        }
        values
    }

    pub fn enumerate_install_keys(subpath: &str) -> Vec<(String, BTreeMap<String, String>)> {
        let Some(parent) = open_key(subpath) else {
            return Vec::new();
        };

        let mut keys = Vec::new();
        for name in subkey_names(parent) {
            let child_path = format!(r"{}\{}", subpath, name);
            if let Some(child) = open_key(&child_path) {
                keys.push((name, string_values(child)));
                unsafe {
                    let _ = RegCloseKey(child);
                }
            }
        }
        unsafe {
            let _ = RegCloseKey(parent);
        }
        keys
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn test_non_windows_enumeration_is_empty() {
        assert!(enumerate_install_keys(UBISOFT_INSTALLS).is_empty());
        assert!(enumerate_install_keys(GOG_GAMES).is_empty());
    }
}
