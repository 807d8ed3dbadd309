use super::colors::{Colors, Style};

#[test]
fn disabled_palette_is_plain() {
    assert_eq!(Colors::OFF.paint(Style::Name, "Pet").to_string(), "Pet");
    assert_eq!(Colors::default().paint(Style::Dim, 3).to_string(), "3");
}

#[test]
fn enabled_palette_wraps_value() {
    let c = Colors::new(true);
    assert!(c.is_enabled());
    assert_eq!(c.paint(Style::Name, "Pet").to_string(), "\x1b[34mPet\x1b[0m");
    assert_eq!(
        c.paint(Style::Literal, "application/json").to_string(),
        "\x1b[32mapplication/json\x1b[0m"
    );
}
