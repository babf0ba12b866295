//! Scripted, headless walk through a contact form.
//!
//! Usage: `form [SCRIPT]`. The script holds one command per line (`space`,
//! `enter`, `escape`, `delete`, `backspace`, `up`/`down`/`left`/`right`,
//! `shift DIR`, `type TEXT`, `blur`, `tick MS`); without one a built-in
//! script runs. The rendered tree, the component tree and every host
//! notification are printed at the end.

use std::rc::Rc;

use anyhow::{Context, bail};
use projector_core::{
    Candidate, Command, ConceptRef, Direction, EngineConfig, Model, ProjectionSchema,
    TemplateSchema, Value,
};
use projector_devtools::{HeadlessTarget, Inspector, MemoryConcept, RecordingEnvironment};
use serde::Deserialize;
use serde_json::Value as Json;

const SCHEMA: &str = include_str!("../schema.json");

const DEFAULT_SCRIPT: &str = "\
type  Lovelace
enter
down
space
down
enter
down
space
down
space
type likes tea
down
enter
type math
blur
tick 400
";

#[derive(Deserialize)]
struct SchemaFile {
    #[serde(default)]
    config: EngineConfig,
    #[serde(default)]
    templates: Vec<TemplateSchema>,
    views: Vec<ViewEntry>,
}

#[derive(Deserialize)]
struct ViewEntry {
    concept: String,
    #[serde(default)]
    tag: Option<String>,
    content: Json,
}

enum Step {
    Key(Command),
    Type(String),
    Blur,
    Tick(u64),
}

fn parse_step(line: &str) -> anyhow::Result<Step> {
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let direction = |s: &str| -> anyhow::Result<Direction> {
        Ok(match s.trim() {
            "up" => Direction::Up,
            "down" => Direction::Down,
            "left" => Direction::Left,
            "right" => Direction::Right,
            other => bail!("unknown direction `{other}`"),
        })
    };
    Ok(match word {
        "space" => Step::Key(Command::Space),
        "enter" => Step::Key(Command::Enter),
        "escape" => Step::Key(Command::Escape),
        "delete" => Step::Key(Command::Delete),
        "backspace" => Step::Key(Command::Backspace),
        "up" | "down" | "left" | "right" => Step::Key(Command::Arrow(direction(word)?)),
        "shift" => Step::Key(Command::Shift(direction(rest)?)),
        "type" => Step::Type(rest.to_string()),
        "blur" => Step::Blur,
        "tick" => Step::Tick(rest.trim().parse().context("tick takes milliseconds")?),
        other => bail!("unknown command `{other}`"),
    })
}

fn contact() -> Rc<MemoryConcept> {
    let name = MemoryConcept::builder("contact.name", "text")
        .value("Ada")
        .validator(|v| match v {
            Value::Text(t) if t.trim().is_empty() => Err("a contact needs a name".to_string()),
            _ => Ok(()),
        })
        .build();
    let color = MemoryConcept::builder("contact.color", "color")
        .candidates(vec![
            Candidate::new("red", "Red", "red"),
            Candidate::new("green", "Green", "green"),
            Candidate::new("blue", "Blue", "blue"),
        ])
        .build();
    let tags = MemoryConcept::builder("contact.tags", "tags")
        .collection_of("tag")
        .element(MemoryConcept::builder("contact.tags/0", "tag").value("poetry").build())
        .build();
    MemoryConcept::builder("contact", "contact")
        .attribute_with("name", name)
        .attribute_with("color", color)
        .attribute_with("subscribed", MemoryConcept::new("contact.subscribed", "flag"))
        .attribute("note", "text", true)
        .attribute_with("tags", tags)
        .build()
}

fn load(model: &mut Model, schema: SchemaFile) {
    for template in schema.templates {
        model.register_template(template);
    }
    for view in schema.views {
        let mut projection = ProjectionSchema::new(view.content);
        if let Some(tag) = view.tag {
            projection = projection.tagged(tag);
        }
        model.register_projection(view.concept, projection);
    }
}

fn run(model: &mut Model, step: Step) -> anyhow::Result<bool> {
    Ok(match step {
        Step::Key(command) => model.handle(command, None)?,
        Step::Type(text) => model.input(&text)?,
        Step::Blur => {
            model.blur()?;
            true
        }
        Step::Tick(ms) => {
            let now = model.now() + web_time::Duration::from_millis(ms);
            model.tick(now)? > 0
        }
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let script = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => DEFAULT_SCRIPT.to_string(),
    };
    let schema: SchemaFile = serde_json::from_str(SCHEMA).context("parsing the form schema")?;

    let target = HeadlessTarget::new();
    let env = RecordingEnvironment::new();
    let notices = env.notices();
    let mut model = Model::new(Box::new(target), Box::new(env)).with_config(schema.config.clone());
    projector_ui::install(&mut model);
    load(&mut model, schema);

    let contact: ConceptRef = contact();
    let resolution = model.project(contact, None)?;
    let pid = resolution
        .projection()
        .context("the contact has no projection")?;
    let root = resolution.element().context("the contact rendered nothing")?;

    for (n, line) in script.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let step = parse_step(line).with_context(|| format!("script line {}", n + 1))?;
        let handled = run(&mut model, step)?;
        log::info!("{line:<16} -> {}", if handled { "handled" } else { "ignored" });
    }

    println!("{}", projector_devtools::dump(model.target(), root));
    println!("{}", Inspector::new().dump(&model, pid));
    for notice in notices.all() {
        println!("{:?}: {}", notice.severity, notice.message);
    }
    Ok(())
}
