/// The synchronous browser boundary.
///
/// Everything the tracker needs from the surrounding page goes through
/// this trait: URL and referrer, browser characteristics, cookie
/// access, frame position, the script tag's own `src`, and navigation.
/// Production embedders bind it to the real DOM host; tests use an
/// in-memory fake. No method may block.
pub trait Page: Send + Sync {
    /// Full URL of the current page, including the query string.
    fn url(&self) -> String;

    fn referrer(&self) -> Option<String>;

    fn user_agent(&self) -> String;

    fn platform(&self) -> String;

    fn language(&self) -> String;

    /// "<w>x<h>", when the host exposes it.
    fn screen_resolution(&self) -> Option<String>;

    /// "<w>x<h>", when the host exposes it.
    fn viewport_size(&self) -> Option<String>;

    fn cookies_enabled(&self) -> bool;

    fn read_cookie(&self, name: &str) -> Option<String>;

    /// Best-effort write. Hosts with cookies blocked silently drop it;
    /// the identity store's init probe detects that.
    fn write_cookie(&self, name: &str, value: &str, max_age_minutes: u32);

    fn delete_cookie(&self, name: &str);

    /// False inside an embedded frame. The tracker performs no work at
    /// all when it is not the top-level browsing context.
    fn is_top_frame(&self) -> bool;

    /// `src` of the script tag that loaded the tracker. The backend
    /// endpoint is derived from its origin.
    fn script_src(&self) -> Option<String>;

    /// Programmatic navigation, used after intercepting an outbound
    /// checkout link.
    fn navigate(&self, url: &str);
}
