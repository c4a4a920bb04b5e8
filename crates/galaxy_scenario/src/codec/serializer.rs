//! Script writer.

use super::{mirror_axis, LINE_ENDING};
use crate::scenario::{Annotation, Lane, PositionRange, Scenario, Settings, System};

const PREAMBLE: &str = "static_galaxy_scenario = {";

/// Renders a complete `static_galaxy_scenario` script with CRLF line endings.
///
/// Sections are settings, systems, hyperlanes and nebulae, each under its own
/// comment banner and separated by a blank line.
pub fn serialize(scenario: &Scenario) -> String {
    let sections = [
        settings_section(scenario.settings()),
        section("Systems", scenario.export_systems().into_iter().map(system_line)),
        section("Hyperlanes", scenario.export_lanes().into_iter().map(lane_line)),
        section("Nebulae", scenario.export_annotations().into_iter().map(nebula_line)),
        format!(
            "\t# Exported by galaxy_scenario v{}{LINE_ENDING}",
            env!("CARGO_PKG_VERSION")
        ),
    ];

    let mut out = String::with_capacity(sections.iter().map(String::len).sum::<usize>() + 64);
    out.push_str(PREAMBLE);
    out.push_str(LINE_ENDING);
    out.push_str(&sections.join(LINE_ENDING));
    out.push('}');
    out
}

fn banner(title: &str) -> String {
    let rule = "#".repeat(title.len() + 2);
    format!("\t{rule}{LINE_ENDING}\t#{title}{LINE_ENDING}\t{rule}{LINE_ENDING}")
}

fn section(title: &str, lines: impl Iterator<Item = String>) -> String {
    let mut out = banner(title);
    for line in lines {
        out.push('\t');
        out.push_str(&line);
        out.push_str(LINE_ENDING);
    }
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn settings_section(settings: &Settings) -> String {
    let lines = [
        format!("name = \"{}\"", strip_quotes(&settings.name)),
        format!("priority = {}", settings.priority),
        format!("default = {}", yes_no(settings.is_default)),
        format!(
            "num_empires = {{ min = {} max = {} }}",
            settings.num_empires_min, settings.num_empires_max
        ),
        format!("num_empire_default = {}", settings.num_empire_default),
        format!("fallen_empire_default = {}", settings.fallen_empire_default),
        format!("fallen_empire_max = {}", settings.fallen_empire_max),
        format!("advanced_empire_default = {}", settings.advanced_empire_default),
        format!("colonizable_planet_odds = {}", settings.colonizable_planet_odds),
        format!("random_hyperlanes = {}", yes_no(settings.random_hyperlanes)),
    ];
    section("Settings", lines.into_iter())
}

/// Text safe inside a quoted field on a single line.
fn strip_quotes(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '"')
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Bare script identifier; anything outside `[A-Za-z0-9_]` becomes `_`.
fn identifier(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn axis(name: &str, value: f64, range: Option<PositionRange>) -> String {
    match range {
        Some(PositionRange { min, max }) => format!("{name} = {{ min = {min} max = {max} }}"),
        None => format!("{name} = {value}"),
    }
}

fn system_line(system: &System) -> String {
    let mut line = format!(
        "system = {{ id = \"{}\" name = \"{}\" position = {{ {} {} }}",
        system.id,
        strip_quotes(&system.name),
        axis("x", mirror_axis(system.location.x), system.x_range),
        axis("y", system.location.y, system.y_range),
    );

    if let Some(initializer) = &system.initializer {
        let initializer = identifier(initializer);
        if initializer.is_empty() {
            line.push_str(" initializer = \"\"");
        } else {
            line.push_str(&format!(" initializer = {initializer}"));
        }
    }
    if let Some(spawn) = &system.spawn_weight {
        line.push_str(&format!(
            " spawn_weight = {{ base = {} modifier = {{ add = {} has_country_flag = {} }} }}",
            spawn.base,
            spawn.add,
            identifier(&spawn.country_flag)
        ));
    }
    line.push_str(" }");
    line
}

fn lane_line(lane: Lane) -> String {
    format!("add_hyperlane = {{ from = \"{}\" to = \"{}\" }}", lane.from, lane.to)
}

fn nebula_line(nebula: &Annotation) -> String {
    let location = nebula.location();
    format!(
        "nebula = {{ name = \"{}\" position = {{ x = {} y = {} }} radius = {} }}",
        strip_quotes(&nebula.name),
        mirror_axis(location.x),
        location.y,
        nebula.radius()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::SpawnWeight;
    use crate::types::{Point, SystemId};

    #[test]
    fn test_empty_scenario_layout() {
        let text = serialize(&Scenario::new());

        assert!(text.starts_with("static_galaxy_scenario = {\r\n\t##########\r\n\t#Settings\r\n"));
        assert!(text.contains("\tname = \"defaultName\"\r\n"));
        assert!(text.contains("\tdefault = no\r\n"));
        assert!(text.contains("\tnum_empires = { min = 1 max = 10 }\r\n"));
        assert!(text.contains("\tcolonizable_planet_odds = 0\r\n"));
        assert!(text.contains("\r\n\r\n\t############\r\n\t#Hyperlanes\r\n"));
        assert!(text.ends_with("\r\n}"));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_system_line_mirrors_x_and_keeps_ranges() {
        let mut drift = System::new(SystemId(2), "Drift", Point::new(-13.0, 2.0));
        drift.x_range = Some(PositionRange { min: 10, max: 15 });
        assert_eq!(
            system_line(&drift),
            "system = { id = \"2\" name = \"Drift\" position = { x = { min = 10 max = 15 } y = 2 } }"
        );

        let home = System::new(SystemId(3), "Ho\"me", Point::new(0.0, -4.5))
            .with_initializer("home_init")
            .with_spawn_weight(SpawnWeight {
                base: 0,
                add: 3,
                country_flag: "human_1".into(),
            });
        assert_eq!(
            system_line(&home),
            "system = { id = \"3\" name = \"Home\" position = { x = 0 y = -4.5 } initializer = home_init \
             spawn_weight = { base = 0 modifier = { add = 3 has_country_flag = human_1 } } }"
        );
    }

    #[test]
    fn test_free_text_fields_survive_a_reload() {
        let mut scenario = Scenario::new();
        scenario.add_system(
            System::new(SystemId(1), "Two\nLines", Point::new(5.0, 5.0))
                .with_initializer("foo bar")
                .with_spawn_weight(SpawnWeight {
                    base: 1,
                    add: 2,
                    country_flag: "flag-x".into(),
                }),
        );
        scenario.add_system(System::new(SystemId(2), "Blank", Point::new(0.0, 0.0)).with_initializer(""));
        scenario.add_system(
            System::new(SystemId(3), "NoFlag", Point::new(1.0, 1.0)).with_spawn_weight(SpawnWeight {
                base: 0,
                add: 0,
                country_flag: String::new(),
            }),
        );

        let text = serialize(&scenario);
        assert!(text.contains("name = \"Two Lines\""));

        let parsed = crate::codec::parse_str(&text).unwrap();
        assert_eq!(parsed.systems.len(), 3);

        let first = &parsed.systems[0];
        assert_eq!(first.name, "Two Lines");
        assert_eq!(first.initializer.as_deref(), Some("foo_bar"));
        assert_eq!(first.spawn_weight.as_ref().map(|w| w.country_flag.as_str()), Some("flag_x"));

        assert_eq!(parsed.systems[1].initializer.as_deref(), Some(""));
        assert_eq!(
            parsed.systems[2].spawn_weight,
            Some(SpawnWeight {
                base: 0,
                add: 0,
                country_flag: String::new(),
            })
        );
    }

    #[test]
    fn test_nebula_line() {
        let nebula = Annotation::new("Shroud", Point::new(-40.0, -20.0), 30.0);
        assert_eq!(
            nebula_line(&nebula),
            "nebula = { name = \"Shroud\" position = { x = 40 y = -20 } radius = 30 }"
        );
    }
}
