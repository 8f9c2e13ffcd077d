use regex::Regex;

use crate::document::Selection;
use crate::fail::Fail;

/// Custom logic over the current selection. Implementations call
/// [`Fail::fatal`] themselves.
pub trait HtmlChecker {
    fn check_html(&self, fail: &Fail, selection: &Selection);
}

impl<F> HtmlChecker for F
where
    F: Fn(&Fail, &Selection),
{
    fn check_html(&self, fail: &Fail, selection: &Selection) {
        self(fail, selection)
    }
}

/// Assertions over (part of) an HTML response.
///
/// Every asserter owns its selection and its own copy of the fail, so taking
/// [`assert_all`](Self::assert_all) twice from the same asserter yields two
/// branches that cannot see each other's narrowing.
pub struct HtmlAsserter {
    selection: Selection,
    fail: Fail,
}

impl HtmlAsserter {
    pub(super) fn new(selection: Selection, fail: &Fail) -> Self {
        Self {
            fail: fail.clone().with_selection(selection.clone()),
            selection,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn fail(&self) -> &Fail {
        &self.fail
    }

    pub fn count(&self, expected: usize) -> &Self {
        let actual = self.selection.len();
        if actual != expected {
            self.fail
                .fatal(format_args!("count: exp '{expected}': got: '{actual}'"));
        }
        self
    }

    /// Narrow to every element below the current selection that matches
    /// `selector`. Matching nothing is fatal.
    pub fn assert_all(&self, selector: &str) -> HtmlAsserter {
        let found = match self.selection.find(selector) {
            Ok(found) => found,
            Err(err) => self.fail.fatal(err),
        };
        if found.is_empty() {
            self.fail
                .fatal(format_args!("selector '{selector}' didn't yield anything"));
        }
        HtmlAsserter::new(found, &self.fail)
    }

    pub fn text(&self, expected: &str) -> &Self {
        let actual = self.selection.text();
        if actual != expected {
            self.fail
                .fatal(format_args!("text: exp '{expected}': got: '{actual}'"));
        }
        self
    }

    pub fn text_match(&self, pattern: &str) -> &Self {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(err) => self
                .fail
                .fatal(format_args!("failed to compile match expression: {err}")),
        };

        let actual = self.selection.text();
        if !re.is_match(&actual) {
            self.fail.fatal(format_args!(
                "text match: exp text to match '{pattern}': got: '{actual}'"
            ));
        }
        self
    }

    /// Compare an attribute of the first selected element; a missing
    /// attribute reads as an empty string.
    pub fn attr(&self, name: &str, expected: &str) -> &Self {
        let actual = self.selection.attr(name).unwrap_or_default();
        if actual != expected {
            self.fail
                .fatal(format_args!("attr '{name}': exp '{expected}': got: '{actual}'"));
        }
        self
    }

    pub fn check(&self, checker: impl HtmlChecker) -> &Self {
        checker.check_html(&self.fail, &self.selection);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::document::Document;
    use crate::fail::capture;

    fn root(fail: &Fail, markup: &str) -> HtmlAsserter {
        let doc = Document::parse(markup.as_bytes()).unwrap();
        HtmlAsserter::new(Selection::root(Rc::new(doc)), fail)
    }

    #[test]
    fn assertions_pass_on_matching_markup() {
        let outcome = capture(|fail| {
            root(&fail, r#"<p class="bar">foo</p>"#)
                .assert_all("p")
                .count(1)
                .text("foo")
                .attr("class", "bar")
                .attr("id", "")
                .text_match(".o.");
        });
        assert_eq!(outcome, Ok(()));
    }

    #[test]
    fn text_mismatch_names_both_values() {
        let err = capture(|fail| {
            root(&fail, "<p>foo</p>").assert_all("p").text("nope");
        })
        .unwrap_err();
        assert!(err.message.starts_with("text: exp 'nope': got: 'foo'"), "{err}");
        assert!(err.message.contains("==== HTML SELECTION: <p>foo</p>"), "{err}");
    }

    #[test]
    fn empty_match_is_fatal_even_after_passing_assertions() {
        let err = capture(|fail| {
            let p = root(&fail, "<p>foo</p>").assert_all("p");
            p.count(1).text("foo");
            p.assert_all("span");
        })
        .unwrap_err();
        assert!(
            err.message.starts_with("selector 'span' didn't yield anything"),
            "{err}"
        );
    }

    #[test]
    fn invalid_selector_is_fatal() {
        let err = capture(|fail| {
            root(&fail, "<p>foo</p>").assert_all("p[");
        })
        .unwrap_err();
        assert!(err.message.starts_with("invalid selector 'p['"), "{err}");
    }

    #[test]
    fn bad_pattern_is_fatal() {
        let err = capture(|fail| {
            root(&fail, "<p>foo</p>").text_match("(unclosed");
        })
        .unwrap_err();
        assert!(
            err.message.starts_with("failed to compile match expression"),
            "{err}"
        );
    }

    #[test]
    fn pattern_mismatch_reports_pattern() {
        let err = capture(|fail| {
            root(&fail, "<p>foo</p>").assert_all("p").text_match(".f.");
        })
        .unwrap_err();
        assert!(err.message.contains("'.f.'"), "{err}");
    }

    #[test]
    fn attr_mismatch_reports_values() {
        let err = capture(|fail| {
            root(&fail, r#"<p class="bar">foo</p>"#)
                .assert_all("p")
                .attr("class", "bogus");
        })
        .unwrap_err();
        assert!(
            err.message.starts_with("attr 'class': exp 'bogus': got: 'bar'"),
            "{err}"
        );
    }

    #[test]
    fn count_mismatch_reports_values() {
        let err = capture(|fail| {
            root(&fail, "<p>a</p><p>b</p>").assert_all("p").count(3);
        })
        .unwrap_err();
        assert!(err.message.starts_with("count: exp '3': got: '2'"), "{err}");
    }

    #[test]
    fn checker_receives_scoped_selection() {
        let err = capture(|fail| {
            root(&fail, "<ul><li>a</li><li>b</li></ul>")
                .assert_all("li")
                .check(|fail: &Fail, sel: &Selection| {
                    if sel.len() == 2 {
                        fail.fatal("two items");
                    }
                });
        })
        .unwrap_err();
        assert!(err.message.starts_with("two items"), "{err}");
        assert!(err.message.contains("<li>a</li>"), "{err}");
    }
}
