use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::netsh::WlanTool;
use crate::error::WifiBackupError;

const ILLEGAL_FILE_NAME_CHARS: &str = "<>:\"/\\|?*";

/// Replace characters Windows forbids in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_FILE_NAME_CHARS.contains(c) { '_' } else { c })
        .collect()
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// WLAN profile XML for a WPA2-PSK/AES infrastructure network that
/// connects automatically.
pub fn render_profile_xml(name: &str, key: &str) -> String {
    let name = escape_xml(name);
    let key = escape_xml(key);
    format!(
        r#"<?xml version="1.0"?>
<WLANProfile xmlns="http://www.microsoft.com/networking/WLAN/profile/v1">
    <name>{name}</name>
    <SSIDConfig>
        <SSID>
            <name>{name}</name>
        </SSID>
    </SSIDConfig>
    <connectionType>ESS</connectionType>
    <connectionMode>auto</connectionMode>
    <MSM>
        <security>
            <authEncryption>
                <authentication>WPA2PSK</authentication>
                <encryption>AES</encryption>
                <useOneX>false</useOneX>
            </authEncryption>
            <sharedKey>
                <keyType>passPhrase</keyType>
                <protected>false</protected>
                <keyMaterial>{key}</keyMaterial>
            </sharedKey>
        </security>
    </MSM>
</WLANProfile>
"#
    )
}

/// Absolute path of the descriptor written for `name` inside `temp_dir`.
pub fn descriptor_path(temp_dir: &Path, name: &str) -> PathBuf {
    let path = temp_dir.join(format!("temp_{}.xml", sanitize_file_name(name)));
    std::path::absolute(&path).unwrap_or(path)
}

/// Removes the descriptor when dropped, whichever way the install ends.
struct TempDescriptor {
    path: PathBuf,
}

impl TempDescriptor {
    fn write(path: PathBuf, content: &str) -> Result<Self, WifiBackupError> {
        // Guard exists before the write so a partial file is cleaned up too.
        let guard = Self { path };
        fs::write(&guard.path, content)
            .map_err(|e| WifiBackupError::filesystem("write profile descriptor", &guard.path, e))?;
        Ok(guard)
    }
}

impl Drop for TempDescriptor {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}

/// Install a profile for `name` with passphrase `key`.
///
/// The sanitized name is only used for the temporary file; the descriptor
/// itself carries the original name.
pub fn install_profile(
    tool: &dyn WlanTool,
    temp_dir: &Path,
    name: &str,
    key: &str,
) -> Result<(), WifiBackupError> {
    let descriptor = TempDescriptor::write(descriptor_path(temp_dir, name), &render_profile_xml(name, key))?;

    let output = tool.add_profile(&descriptor.path)?;
    if !output.success {
        return Err(WifiBackupError::ExternalTool(output.diagnostic()));
    }

    tracing::info!("Added Wi-Fi profile {}", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_illegal_characters() {
        assert_eq!(sanitize_file_name("My:Net*"), "My_Net_");
        assert_eq!(sanitize_file_name(r#"a<b>c"d/e\f|g?h"#), "a_b_c_d_e_f_g_h");
        assert_eq!(sanitize_file_name("家里的网络 5G"), "家里的网络 5G");
    }

    #[test]
    fn sanitizing_twice_changes_nothing() {
        for name in ["My:Net*", "plain", "<<>>", ""] {
            let once = sanitize_file_name(name);
            assert_eq!(sanitize_file_name(&once), once);
        }
    }

    #[test]
    fn descriptor_embeds_original_name_twice() {
        let xml = render_profile_xml("My:Net*", "secret123");
        assert_eq!(xml.matches("<name>My:Net*</name>").count(), 2);
        assert!(xml.contains("<keyMaterial>secret123</keyMaterial>"));
        assert!(xml.contains("<authentication>WPA2PSK</authentication>"));
        assert!(xml.contains("<encryption>AES</encryption>"));
        assert!(xml.contains("<connectionMode>auto</connectionMode>"));
        assert!(xml.contains(r#"xmlns="http://www.microsoft.com/networking/WLAN/profile/v1""#));
    }

    #[test]
    fn descriptor_escapes_markup() {
        let xml = render_profile_xml("Tom & Jerry's <Net>", "a<b&c");
        assert!(xml.contains("<name>Tom &amp; Jerry&apos;s &lt;Net&gt;</name>"));
        assert!(xml.contains("<keyMaterial>a&lt;b&amp;c</keyMaterial>"));
    }

    #[test]
    fn descriptor_path_uses_sanitized_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = descriptor_path(dir.path(), "My:Net*");
        assert!(path.is_absolute());
        assert_eq!(path.file_name().unwrap(), "temp_My_Net_.xml");
    }
}
