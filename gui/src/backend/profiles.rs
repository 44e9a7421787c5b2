use crate::backend::netsh::WlanTool;
use crate::error::WifiBackupError;
use crate::models::profile::Credential;

/// Line prefixes of `show profiles` entries, per display language.
pub const PROFILE_MARKERS: &[&str] = &["All User Profile", "所有用户配置文件"];

/// Line prefixes of the cleartext key in `show profile ... key=clear`.
pub const KEY_MARKERS: &[&str] = &["Key Content", "关键内容"];

/// Trimmed text after the first colon of each line carrying one of `markers`.
fn marked_values<'a>(text: &'a str, markers: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
    text.lines()
        .filter(|line| markers.iter().any(|marker| line.contains(marker)))
        .filter_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim())
}

/// Profile names listed in `show profiles` output, in listing order.
pub fn parse_profile_names(text: &str) -> Vec<String> {
    marked_values(text, PROFILE_MARKERS)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cleartext key from `show profile ... key=clear` output.
pub fn parse_key_content(text: &str) -> Option<String> {
    marked_values(text, KEY_MARKERS).next().map(str::to_string)
}

/// List every saved profile name.
///
/// An empty list is not an error; a failing tool is.
pub fn list_profiles(tool: &dyn WlanTool) -> Result<Vec<String>, WifiBackupError> {
    let output = tool.show_profiles()?;
    if !output.success {
        return Err(WifiBackupError::ExternalTool(output.diagnostic()));
    }

    let profiles = parse_profile_names(&output.stdout_text());
    tracing::info!("Found {} saved Wi-Fi profiles", profiles.len());
    Ok(profiles)
}

/// Fetch the cleartext key of `name`.
///
/// Never fails: tool errors degrade to [`Credential::ExtractionFailed`] and a
/// missing key line to [`Credential::NotFound`].
pub fn get_credential(tool: &dyn WlanTool, name: &str) -> Credential {
    let output = match tool.show_profile_key(name) {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("Failed to read key for {}: {}", name, e);
            return Credential::ExtractionFailed;
        }
    };

    if !output.success {
        tracing::warn!("Failed to read key for {}: {}", name, output.diagnostic());
        return Credential::ExtractionFailed;
    }

    match parse_key_content(&output.stdout_text()) {
        Some(key) => Credential::Key(key),
        None => {
            tracing::debug!("No key content for {}", name);
            Credential::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_PROFILES_EN: &str = "\r
Profiles on interface Wi-Fi:\r
\r
Group policy profiles (read only)\r
---------------------------------\r
    <None>\r
\r
User profiles\r
-------------\r
    All User Profile     : HomeWiFi\r
    All User Profile     : Office Net\r
    All User Profile     : \r
    All User Profile     : Cafe: Guest\r
";

    const SHOW_PROFILES_ZH: &str = "
接口 WLAN 上的配置文件:

用户配置文件
-------------
    所有用户配置文件 : 家里的网络
    所有用户配置文件 : TP-LINK_5G
";

    #[test]
    fn english_listing() {
        assert_eq!(
            parse_profile_names(SHOW_PROFILES_EN),
            vec!["HomeWiFi", "Office Net", "Cafe: Guest"]
        );
    }

    #[test]
    fn chinese_listing() {
        assert_eq!(parse_profile_names(SHOW_PROFILES_ZH), vec!["家里的网络", "TP-LINK_5G"]);
    }

    #[test]
    fn listing_without_markers_is_empty() {
        assert!(parse_profile_names("There is no wireless interface on the system.").is_empty());
    }

    #[test]
    fn key_content_is_found() {
        let output = "Security settings\n    Authentication : WPA2-Personal\n    Key Content            : p@ss: word \n";
        assert_eq!(parse_key_content(output).as_deref(), Some("p@ss: word"));

        let output = "安全设置\n    关键内容            : 12345678\n";
        assert_eq!(parse_key_content(output).as_deref(), Some("12345678"));
    }

    #[test]
    fn missing_key_content() {
        assert_eq!(parse_key_content("    Security key : Absent\n"), None);
    }
}
