use regex::Regex;

// Minified script layouts seen across scanner versions, most specific first.
const TOKEN_PATTERNS: &[&str] = &[
    r#"getApiToken\(\),value:function\(\)\{return"([^"]+)""#,
    r#"getApiToken\(\)\{return"([^"]+)""#,
    r#"getApiToken:function\(\)\{return"([^"]+)""#,
    r#"getApiToken.*?return"([^"]+)""#,
];

/// Pull the web UI API token out of the scanner's bundled script.
pub fn extract_api_token(script: &str) -> Option<String> {
    TOKEN_PATTERNS.iter().find_map(|pattern| {
        let re = Regex::new(pattern).ok()?;
        re.captures(script).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
    })
}
