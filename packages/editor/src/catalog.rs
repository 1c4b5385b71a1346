//! Built-in content: the starter page and the default block catalog

use crate::blocks::Block;

/// Page shown when nothing has been stored yet
pub const STARTER_MARKUP: &str = r##"
<!-- NAVBAR -->
<nav style="
  display:flex;
  justify-content:space-between;
  align-items:center;
  padding:20px;
  background:#111;
  color:#fff">
  <strong>
    <a href="#home" style="color:#fff;text-decoration:none">MySite</a>
  </strong>
  <div style="display:flex;gap:16px">
    <a href="#home" style="color:#fff">Home</a>
    <a href="#services" style="color:#fff">Services</a>
    <a href="#about" style="color:#fff">About</a>
    <a href="#contact" style="color:#fff">Contact</a>
  </div>
</nav>

<!-- HERO -->
<section style="
  padding:100px 20px;
  text-align:center;
  background:linear-gradient(135deg,#667eea,#764ba2);
  color:white" id="home">
  <h1 style="font-size:clamp(36px,5vw,60px);font-weight:700">
    Build Your Website Faster
  </h1>
  <p style="max-width:650px;margin:24px auto;font-size:18px;opacity:.9">
    Design stunning, responsive websites visually.
  </p>
  <button style="
    margin-top:24px;
    padding:14px 32px;
    background:#f472b6;
    border:none;
    border-radius:999px;
    color:white;
    font-size:16px">
    Get Started
  </button>
</section>

<!-- FOOTER -->
<footer style="padding:40px;text-align:center;background:#111;color:white">
  © 2026 MySite. All rights reserved.
</footer>
"##;

const SECTIONS: &str = "Sections";
const BASIC: &str = "Basic";
const FORMS: &str = "Forms";

/// Default catalog: page sections, basic elements and form controls
pub fn default_blocks() -> Vec<Block> {
    let mut blocks = section_blocks();
    blocks.extend(basic_blocks());
    blocks.extend(form_blocks());
    blocks
}

fn section_blocks() -> Vec<Block> {
    vec![
        Block::markup(
            "navbar",
            "Navbar",
            SECTIONS,
            r#"
<nav style="display:flex;flex-wrap:wrap;justify-content:space-between;align-items:center;padding:20px;background:#111;color:#fff">
  <strong>MySite</strong>
  <div style="display:flex;flex-wrap:wrap;gap:12px">
    <a style="color:#fff">Home</a>
    <a style="color:#fff">Services</a>
    <a style="color:#fff">About</a>
    <a style="color:#fff">Contact</a>
  </div>
</nav>"#,
        ),
        Block::markup(
            "hero",
            "Hero Section",
            SECTIONS,
            r#"
<section style="padding:90px 20px;text-align:center;
background:linear-gradient(135deg,#667eea,#764ba2);color:white" id="home">
  <h1 style="font-size:clamp(32px,5vw,56px);font-weight:700">
    Build Your Website Faster
  </h1>
  <p style="max-width:640px;margin:20px auto;font-size:18px;opacity:.9">
    Design stunning, responsive websites visually.
  </p>
  <button style="
    margin-top:20px;
    padding:14px 30px;
    background:#f472b6;
    color:white;
    border:none;
    border-radius:999px;
    font-size:16px;
    cursor:pointer">
    Get Started
  </button>
</section>"#,
        ),
        Block::markup(
            "features",
            "Features",
            SECTIONS,
            r#"
<section style="padding:70px 20px;background:#f8f9ff">
  <h2 style="text-align:center;color:#333">Why Choose Us</h2>
  <div style="
    display:grid;
    grid-template-columns:repeat(auto-fit,minmax(250px,1fr));
    gap:24px;
    max-width:1100px;
    margin:50px auto">
    <div style="padding:28px;border-radius:16px;
      background:linear-gradient(135deg,#667eea,#764ba2);
      color:white;box-shadow:0 10px 30px rgba(0,0,0,.15)">
      <h3>⚡ Fast</h3>
      <p>Optimized performance</p>
    </div>
    <div style="padding:28px;border-radius:16px;
      background:linear-gradient(135deg,#f472b6,#ec4899);
      color:white;box-shadow:0 10px 30px rgba(0,0,0,.15)">
      <h3>📱 Responsive</h3>
      <p>Mobile-first design</p>
    </div>
    <div style="padding:28px;border-radius:16px;
      background:linear-gradient(135deg,#34d399,#059669);
      color:white;box-shadow:0 10px 30px rgba(0,0,0,.15)">
      <h3>🎨 Customizable</h3>
      <p>Style everything visually</p>
    </div>
  </div>
</section>"#,
        ),
        Block::markup(
            "about",
            "About Section",
            SECTIONS,
            r#"
<section style="padding:80px 20px;background:linear-gradient(135deg,#eef2ff,#fdf2f8)" id="about">
  <div style="max-width:1200px;margin:auto;display:flex;flex-wrap:wrap;gap:50px;align-items:center">
    <div style="flex:1 1 300px">
      <h2 style="color:#4338ca">About Us</h2>
      <p style="font-size:17px;color:#333">
        We empower creators to build modern websites without coding,
        using powerful visual tools.
      </p>
    </div>
    <div style="flex:1 1 300px">
      <img src="https://via.placeholder.com/500x350"
        style="width:100%;border-radius:20px;box-shadow:0 20px 40px rgba(0,0,0,.2)"/>
    </div>
  </div>
</section>"#,
        ),
        Block::markup(
            "services",
            "Services",
            SECTIONS,
            r#"
<section style="padding:80px 20px;background:#fff" id="services">
  <h2 style="text-align:center">Our Services</h2>
  <div style="max-width:1200px;margin:50px auto;display:grid;grid-template-columns:repeat(auto-fit,minmax(260px,1fr));gap:30px">
    <div style="padding:30px;border-radius:20px;background:rgba(102,126,234,.1);backdrop-filter:blur(10px)">
      <h3>🎨 Design</h3>
      <p>Modern UI/UX systems</p>
    </div>
    <div style="padding:30px;border-radius:20px;background:rgba(244,114,182,.12);backdrop-filter:blur(10px)">
      <h3>💻 Development</h3>
      <p>Clean scalable code</p>
    </div>
    <div style="padding:30px;border-radius:20px;background:rgba(52,211,153,.12);backdrop-filter:blur(10px)">
      <h3>🚀 SEO</h3>
      <p>Rank higher on Google</p>
    </div>
  </div>
</section>"#,
        ),
        // Only the first of the two historical pricing layouts is registered
        Block::markup(
            "pricing",
            "Pricing",
            SECTIONS,
            r#"
<section style="padding:80px 20px;background:#f8f9ff">
  <h2 style="text-align:center">Pricing</h2>
  <div style="max-width:1100px;margin:50px auto;display:grid;grid-template-columns:repeat(auto-fit,minmax(260px,1fr));gap:30px">
    <div style="padding:40px;border-radius:20px;background:white;text-align:center">
      <h3>Basic</h3>
      <p>$19 / mo</p>
    </div>
    <div style="padding:50px;border-radius:24px;background:linear-gradient(135deg,#667eea,#764ba2);color:white;transform:scale(1.05)">
      <h3>🔥 Pro</h3>
      <p>$49 / mo</p>
    </div>
    <div style="padding:40px;border-radius:20px;background:white;text-align:center">
      <h3>Enterprise</h3>
      <p>Custom</p>
    </div>
  </div>
</section>"#,
        ),
        Block::markup(
            "cta",
            "Call To Action",
            SECTIONS,
            r#"
<section style="padding:90px 20px;text-align:center;background:linear-gradient(135deg,#667eea,#764ba2);color:white">
  <h2>Ready to build?</h2>
  <p>Start creating your website today.</p>
  <button style="margin-top:20px;padding:14px 32px;background:#f472b6;border:none;border-radius:999px;color:white;font-size:16px">
    Get Started
  </button>
</section>"#,
        ),
        Block::markup(
            "contact-section",
            "Contact Section",
            SECTIONS,
            r#"
<section style="padding:60px 20px" id="contact">
  <h2 style="text-align:center">Contact Us</h2>
  <form style="max-width:600px;margin:40px auto;display:flex;flex-direction:column;gap:12px">
    <input placeholder="Name" style="padding:12px"/>
    <input placeholder="Email" style="padding:12px"/>
    <textarea placeholder="Message" style="padding:12px"></textarea>
    <button style="padding:14px;background:#111;color:white;border:none">
      Send Message
    </button>
  </form>
</section>"#,
        ),
        Block::markup(
            "faq",
            "FAQ",
            SECTIONS,
            r#"
<section style="padding:60px 20px">
  <h2 style="text-align:center">FAQs</h2>
  <div style="max-width:800px;margin:40px auto">
    <p><strong>❓ Is this responsive?</strong><br/>Yes, fully mobile-friendly.</p>
    <p><strong>❓ Can I export HTML?</strong><br/>Yes, clean static HTML.</p>
    <p><strong>❓ No coding required?</strong><br/>Absolutely.</p>
  </div>
</section>"#,
        ),
        Block::markup(
            "footer",
            "Footer",
            SECTIONS,
            r#"
<footer style="padding:40px;text-align:center;background:#111;color:white">
  © 2026 MySite. All rights reserved.
</footer>"#,
        ),
    ]
}

fn basic_blocks() -> Vec<Block> {
    vec![
        Block::markup(
            "text",
            "Text",
            BASIC,
            r#"<div style="padding:10px">Insert your text here</div>"#,
        ),
        Block::markup("link", "Link", BASIC, r##"<a href="#">Link</a>"##),
        Block::markup(
            "image",
            "Image",
            BASIC,
            r#"<img src="https://via.placeholder.com/350x250" alt="" style="max-width:100%"/>"#,
        ),
        Block::markup(
            "column1",
            "1 Column",
            BASIC,
            r#"<div style="display:flex;padding:10px;min-height:75px"><div style="flex:1 1 100%;padding:10px"></div></div>"#,
        ),
        Block::markup(
            "column2",
            "2 Columns",
            BASIC,
            r#"<div style="display:flex;padding:10px;min-height:75px"><div style="flex:1 1 50%;padding:10px"></div><div style="flex:1 1 50%;padding:10px"></div></div>"#,
        ),
    ]
}

fn form_blocks() -> Vec<Block> {
    vec![
        Block::markup(
            "form",
            "Form",
            FORMS,
            r#"<form method="get" style="display:flex;flex-direction:column;gap:10px;padding:10px"></form>"#,
        ),
        Block::markup(
            "input",
            "Input",
            FORMS,
            r#"<input type="text" name="" placeholder="Type here" style="padding:8px"/>"#,
        ),
        Block::markup(
            "textarea",
            "Textarea",
            FORMS,
            r#"<textarea placeholder="Type here" style="padding:8px"></textarea>"#,
        ),
        Block::markup(
            "button",
            "Button",
            FORMS,
            r#"<button type="submit" style="padding:10px 20px">Send</button>"#,
        ),
        Block::markup("label", "Label", FORMS, "<label>Label</label>"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockContent, BlockRegistry};
    use crate::devices::DeviceManager;
    use crate::document::{Document, ROOT_ID};
    use pagecraft_parser::parse_fragment;

    #[test]
    fn test_every_block_parses() {
        for block in default_blocks() {
            if let BlockContent::Markup(markup) = &block.content {
                let tree = parse_fragment(markup)
                    .unwrap_or_else(|e| panic!("{} failed to parse: {}", block.id, e));
                assert!(!tree.is_empty(), "{} is empty", block.id);
            }
        }
    }

    #[test]
    fn test_catalog_has_unique_ids() {
        let registry = BlockRegistry::with_blocks(default_blocks()).unwrap();
        assert_eq!(registry.len(), 20);

        let categories: Vec<_> = registry.categories().keys().copied().collect();
        assert_eq!(categories, vec!["Sections", "Basic", "Forms"]);
    }

    #[test]
    fn test_every_block_instantiates() {
        let registry = BlockRegistry::with_blocks(default_blocks()).unwrap();
        let mut doc = Document::new(DeviceManager::default());

        let ids: Vec<String> = registry.list().map(|b| b.id.clone()).collect();
        for (index, id) in ids.iter().enumerate() {
            registry.instantiate(id, &mut doc, ROOT_ID, index).unwrap();
        }

        assert_eq!(doc.children(ROOT_ID).unwrap().len(), 20);
        doc.validate_tree().unwrap();
    }

    #[test]
    fn test_starter_markup_parses_to_three_sections() {
        let tree = parse_fragment(STARTER_MARKUP).unwrap();
        let tags: Vec<_> = tree.roots.iter().filter_map(|n| n.tag()).collect();
        assert_eq!(tags, vec!["nav", "section", "footer"]);
    }
}
