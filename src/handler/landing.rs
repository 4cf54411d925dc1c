//! Landing page served at `/`

/// Static HTML describing where vocabulary pages and contexts live
pub const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Murmurations Namespace</title>
</head>
<body>
    <h1>Murmurations Namespace</h1>
    <h2>Vocabulary and Contexts for Murmurations</h2>
    <p>Vocabulary definitions are hosted in the root directory (e.g., <a href="/linkedSchemas"><code>linkedSchemas</code> definition</a>), and contexts are hosted in the <code>/contexts</code> directory (e.g., <a href="/contexts/karte_von_morgen-v1.0.0.jsonld">karte_von_morgen-v1.0.0.jsonld</a>).</p>
</body>
</html>
"#;
