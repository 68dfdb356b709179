//! Live reload script injection.

use std::borrow::Cow;
use std::time::Duration;

use crate::resolve::MTIME_PATH;

const CLOSING_BODY: &[u8] = b"</body>";

/// Client-side polling loop.
///
/// `lastMtime` stays 0 until the first successful poll, so the first
/// response only records a baseline. Fetch and parse failures are dropped
/// and retried on the next tick.
const SCRIPT_TEMPLATE: &str = r"
<script>
(function() {
    let lastMtime = 0;
    setInterval(async () => {
        try {
            const res = await fetch('{mtime_path}', { cache: 'no-store' });
            const mtime = await res.json();
            if (lastMtime && mtime > lastMtime) location.reload();
            lastMtime = mtime;
        } catch (e) {}
    }, {interval_ms});
})();
</script>
";

/// The rendered polling script for a given poll interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveReloadScript(String);

impl LiveReloadScript {
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self(
            SCRIPT_TEMPLATE
                .replace("{mtime_path}", MTIME_PATH)
                .replace("{interval_ms}", &poll_interval.as_millis().to_string()),
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Inject this script into `html`. See [`inject`].
    #[must_use]
    pub fn inject<'a>(&self, html: &'a str) -> Cow<'a, str> {
        inject(html, &self.0)
    }
}

impl Default for LiveReloadScript {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

/// Insert `script` right before the first closing body tag.
///
/// The tag is matched ASCII case-insensitively. HTML without a closing
/// body tag is returned unchanged.
#[must_use]
pub fn inject<'a>(html: &'a str, script: &str) -> Cow<'a, str> {
    let Some(pos) = html
        .as_bytes()
        .windows(CLOSING_BODY.len())
        .position(|window| window.eq_ignore_ascii_case(CLOSING_BODY))
    else {
        return Cow::Borrowed(html);
    };

    let mut out = String::with_capacity(html.len() + script.len());
    out.push_str(&html[..pos]);
    out.push_str(script);
    out.push_str(&html[pos..]);
    Cow::Owned(out)
}
