use std::sync::OnceLock;

pub const PORTAL_BASE: &str = "https://sieportal.siemens.com";
pub const CATALOG_BASE: &str = "https://mall.industry.siemens.com/mall";
pub const DEFAULT_READER_BASE: &str = "https://r.jina.ai/";

pub const DEFAULT_PORTAL_LOCALES: &[&str] = &["en-ww", "es-co"];
pub const DEFAULT_CATALOG_LANGS: &[&str] = &["en", "es", "de"];

pub const DEFAULT_SCORE_THRESHOLD: f64 = 75.0;

/// How far past the anchor the assembler may look, per source kind.
pub const PORTAL_SCAN_CHARS: usize = 5000;
pub const CATALOG_SCAN_CHARS: usize = 6000;

/// Substring the reader proxy emits while the target page is still rendering.
pub const NOT_LOADED_MARKER: &str = "not yet fully loaded";

pub const FINAL_MAX_CHARS: usize = 900;
pub const ELLIPSIS: char = '…';

pub fn placeholder_description(mlfb: &str) -> String {
    format!("{mlfb} — ver ficha en Industry Mall.")
}

static COMPOSED_HTML_SCRIPT: OnceLock<String> = OnceLock::new();

/// Serializes the live DOM with open shadow roots inlined and slots filled,
/// skipping `<script>` and `<style>`. Product pages on the portal are web
/// components, so `page.content()` alone misses most of the visible text.
pub fn load_js_script() -> &'static str {
    COMPOSED_HTML_SCRIPT.get_or_init(|| {
        r#"
(function() {
    function walk(node, out) {
        switch (node.nodeType) {
            case Node.ELEMENT_NODE: {
                const tag = node.tagName.toLowerCase();
                if (tag === 'script' || tag === 'style' || tag === 'noscript') {
                    return;
                }
                if (tag === 'slot') {
                    const assigned = node.assignedNodes();
                    const kids = assigned.length > 0 ? assigned : node.childNodes;
                    for (const kid of kids) walk(kid, out);
                    return;
                }
                const attrs = Array.from(node.attributes)
                    .map(a => ` ${a.name}="${a.value}"`)
                    .join('');
                out.push(`<${tag}${attrs}>`);
                const kids = node.shadowRoot ? node.shadowRoot.childNodes : node.childNodes;
                for (const kid of kids) walk(kid, out);
                out.push(`</${tag}>`);
                return;
            }
            case Node.TEXT_NODE:
                out.push(node.textContent);
                return;
            default:
                if (node.childNodes) {
                    for (const kid of node.childNodes) walk(kid, out);
                }
        }
    }
    const out = [];
    for (const kid of document.documentElement.childNodes) walk(kid, out);
    return '<html>' + out.join('') + '</html>';
})()
"#
        .to_string()
    })
}

static STRUCTURED_DESCRIPTION_SCRIPT: OnceLock<String> = OnceLock::new();

/// Pulls a product description out of embedded page state: JSON-LD `Product`
/// blocks first, then the description meta tags. Returns a JSON string
/// `{"kind": "product" | "meta", "text": ...}`, or "" when absent.
pub fn load_structured_description_script() -> &'static str {
    STRUCTURED_DESCRIPTION_SCRIPT.get_or_init(|| {
        r#"
(function() {
    const pick = (obj) => {
        if (!obj || typeof obj !== 'object') return '';
        if (Array.isArray(obj)) {
            for (const item of obj) {
                const found = pick(item);
                if (found) return found;
            }
            return '';
        }
        if (obj['@graph']) return pick(obj['@graph']);
        const type = [].concat(obj['@type'] || []).join(' ');
        if (/Product/i.test(type) && typeof obj.description === 'string') {
            return obj.description;
        }
        return '';
    };
    for (const el of document.querySelectorAll('script[type="application/ld+json"]')) {
        try {
            const found = pick(JSON.parse(el.textContent));
            if (found) return JSON.stringify({ kind: 'product', text: found.trim() });
        } catch (e) {}
    }
    const meta = document.querySelector('meta[property="og:description"], meta[name="description"]');
    return meta && meta.content
        ? JSON.stringify({ kind: 'meta', text: meta.content.trim() })
        : '';
})()
"#
        .to_string()
    })
}
