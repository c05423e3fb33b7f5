use super::*;

#[test]
fn parses_template_command() {
    let cli = Cli::try_parse_from(["kcat", "template", "LC-OAK-CHR-0001"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Template { ref code } if code == "LC-OAK-CHR-0001"
    ));
}

#[test]
fn parses_variants_with_repeated_filters() {
    let cli = Cli::try_parse_from([
        "kcat",
        "variants",
        "LC-OAK-CHR-0001",
        "--filter",
        "Size=Small",
        "--filter",
        "Weight=5",
        "--page",
        "2",
    ])
    .expect("expected valid cli args");

    let Commands::Variants {
        code,
        filters,
        page,
        page_size,
        json,
    } = cli.command
    else {
        panic!("expected variants command");
    };
    assert_eq!(code, "LC-OAK-CHR-0001");
    assert_eq!(
        filters,
        vec![
            ("Size".to_string(), FilterValue::Text("Small".into())),
            ("Weight".to_string(), FilterValue::Text("5".into())),
        ]
    );
    assert_eq!(page, 2);
    assert_eq!(page_size, None);
    assert!(!json);
}

#[test]
fn variants_defaults_to_first_page() {
    let cli = Cli::try_parse_from(["kcat", "variants", "X"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Variants { page: 1, ref filters, .. } if filters.is_empty()
    ));
}

#[test]
fn zero_filter_coerces_to_number() {
    let (_, value) = parse_filter("Length=0").expect("valid filter");
    assert_eq!(value.as_number(), Some(0.0));
}

#[test]
fn numeric_looking_filter_keeps_its_text() {
    let cli = Cli::try_parse_from(["kcat", "variants", "X", "--filter", "Gauge=1.50"])
        .expect("expected valid cli args");

    let Commands::Variants { filters, .. } = cli.command else {
        panic!("expected variants command");
    };
    assert_eq!(
        filters,
        vec![("Gauge".to_string(), FilterValue::Text("1.50".into()))]
    );
    assert_eq!(
        parse_filter("Gauge=02"),
        Ok(("Gauge".to_string(), FilterValue::Text("02".into())))
    );
}

#[test]
fn filter_without_equals_is_rejected() {
    let err = Cli::try_parse_from(["kcat", "variants", "X", "--filter", "Size"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn filter_with_empty_name_or_value_is_rejected() {
    assert!(parse_filter("=Small").is_err());
    assert!(parse_filter("Size=").is_err());
}

#[test]
fn filter_value_may_contain_equals() {
    assert_eq!(
        parse_filter("Finish=Oak=Natural"),
        Ok(("Finish".to_string(), FilterValue::Text("Oak=Natural".into())))
    );
}

#[test]
fn parses_items_with_brand_and_group() {
    let cli = Cli::try_parse_from([
        "kcat", "items", "--brand", "Hollow Home", "--group", "Seating", "--json",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Items {
            brand: Some(ref b),
            group: Some(ref g),
            page: 1,
            json: true,
        } if b == "Hollow Home" && g == "Seating"
    ));
}

#[test]
fn parses_brands_command() {
    let cli = Cli::try_parse_from(["kcat", "brands"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Brands));
}

#[test]
fn parses_quote_add_with_default_quantity() {
    let cli = Cli::try_parse_from(["kcat", "quote", "add", "LC-OAK-CHR-0001-S-5"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Quote {
            command: QuoteCommands::Add { qty: 1, .. }
        }
    ));
}

#[test]
fn parses_quote_set_qty() {
    let cli = Cli::try_parse_from(["kcat", "quote", "set-qty", "A-B-C-0001", "4"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Quote {
            command: QuoteCommands::SetQty { qty: 4, ref code }
        } if code == "A-B-C-0001"
    ));
}

#[test]
fn quote_negative_quantity_is_rejected() {
    assert!(Cli::try_parse_from(["kcat", "quote", "add", "X", "--qty", "-1"]).is_err());
}

#[test]
fn parses_wishlist_toggle() {
    let cli = Cli::try_parse_from(["kcat", "wishlist", "toggle", "A-B-C-0001"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Wishlist {
            command: WishlistCommands::Toggle { .. }
        }
    ));
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["kcat"]).is_err());
}
