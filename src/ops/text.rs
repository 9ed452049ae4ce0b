//! Text conversions: join, to_locale_string

use crate::error::ViewResult;
use crate::format::LocaleFormatter;
use crate::view::TypedView;

impl TypedView {
    /// Elements rendered with the plain number format, separated by
    /// `separator` (default `,`).
    pub fn join(&self, separator: Option<&str>) -> ViewResult<String> {
        const OP: &str = "join";
        let live = self.live();
        let len = live.check(OP)?;
        let values = live.read_all(0, len, OP)?;
        let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
        Ok(parts.join(separator.unwrap_or(",")))
    }

    /// Elements rendered by `formatter`, separated by `,`.
    ///
    /// The formatter runs per element, so the view is checked before each
    /// one.
    pub fn to_locale_string(
        &self,
        formatter: &dyn LocaleFormatter,
        locales: Option<&str>,
        options: Option<&serde_json::Value>,
    ) -> ViewResult<String> {
        const OP: &str = "to_locale_string";
        let live = self.live();
        live.check(OP)?;

        let mut out = String::new();
        let mut k = 0;
        while let Some(value) = live.element_at(k, OP)? {
            if k > 0 {
                out.push(',');
            }
            out.push_str(&formatter.to_localized_string(value, locales, options)?);
            k += 1;
        }
        Ok(out)
    }
}
