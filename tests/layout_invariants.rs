use docflow::{
    AttachmentRef, Company, Contact, DiscountPolicy, DocFlowError, DocumentModel, DrawCommand,
    FillRole, FixedWidthMeasurer, FontMeasurer, LaidOutDocument, LayoutEngine, LineItem,
    OutlineRenderer, PageGeometry, Pt, Renderer, audit,
};

fn company() -> Company {
    let mut company = Company::named("Nile Systems");
    company.address = Some("12 Corniche St, Cairo".to_string());
    company.phone = Some("+20 2 555 0100".to_string());
    company.tax_id = Some("123-456-789".to_string());
    company
}

fn contact() -> Contact {
    let mut contact = Contact::named("Mona Adel");
    contact.company = Some("Delta Foods".to_string());
    contact.email = Some("mona@example.com".to_string());
    contact
}

fn items(count: usize) -> Vec<LineItem> {
    (0..count)
        .map(|i| {
            let item = LineItem::new(format!("Network switch model {i}"), 150.0, (i % 4 + 1) as f64);
            if i % 3 == 0 {
                item.with_detail("Includes installation, configuration and a one year warranty")
            } else {
                item
            }
        })
        .collect()
}

fn layout(doc: &DocumentModel) -> LaidOutDocument {
    LayoutEngine::default()
        .run(doc, &PageGeometry::a4(), &FixedWidthMeasurer::default())
        .expect("layout")
}

fn assert_sound(laid_out: &LaidOutDocument) {
    let violations = audit::check(laid_out);
    assert!(violations.is_empty(), "violations: {violations:?}");
}

fn footer_labels(laid_out: &LaidOutDocument) -> Vec<String> {
    laid_out
        .commands()
        .filter_map(|cmd| match cmd {
            DrawCommand::FooterGroup { page_label, .. } => Some(page_label.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn every_page_has_exactly_one_numbered_footer() {
    let doc = DocumentModel::quotation(company(), contact())
        .with_subject("Warehouse network upgrade")
        .with_reference("Q-2024-017", "2024-05-02")
        .with_items(items(150))
        .with_notes("Prices valid for 30 days.")
        .with_terms("50% advance, balance on delivery.");
    let laid_out = layout(&doc);
    assert!(laid_out.page_count() > 3);
    assert_sound(&laid_out);

    let total = laid_out.page_count();
    let expected: Vec<String> = (1..=total).map(|page| format!("Page {page} of {total}")).collect();
    assert_eq!(footer_labels(&laid_out), expected);
}

#[test]
fn table_header_precedes_rows_on_every_page() {
    let doc = DocumentModel::quotation(company(), contact()).with_items(items(120));
    let laid_out = layout(&doc);
    for page in &laid_out.pages {
        let position = |wanted: fn(&FillRole) -> bool| {
            page.commands.iter().position(|cmd| match cmd {
                DrawCommand::FilledRect { role, .. } => wanted(role),
                _ => false,
            })
        };
        let header = position(|role| matches!(role, FillRole::TableHeader));
        let first_row = position(|role| matches!(role, FillRole::RowStripe { .. }));
        if let Some(first_row) = first_row {
            let header = header.unwrap_or_else(|| panic!("page {} lacks a header", page.number));
            assert!(header < first_row);
        }
    }
}

#[test]
fn first_row_past_the_band_opens_the_next_page_under_a_repeated_header() {
    let geometry = PageGeometry::a4();
    let rows: Vec<LineItem> = (0..40).map(|i| LineItem::new(format!("r{i}"), 10.0, 1.0)).collect();
    let doc = DocumentModel::quotation(company(), contact()).with_items(rows);
    let laid_out = layout(&doc);
    assert_sound(&laid_out);

    let first = &laid_out.pages[0].commands;
    let header_top = first
        .iter()
        .find_map(|cmd| match cmd {
            DrawCommand::FilledRect {
                role: FillRole::TableHeader,
                y,
                ..
            } => Some(*y),
            _ => None,
        })
        .expect("header on page 1");
    let row_height = Pt::from_i32(22);
    let rows_top = header_top + row_height;
    let expected_break = (0..40)
        .find(|&i| rows_top + row_height * (i + 1) > geometry.content_bottom())
        .expect("40 rows overflow one page") as usize;

    let last_on_first = first
        .iter()
        .filter_map(|cmd| match cmd {
            DrawCommand::FilledRect {
                role: FillRole::RowStripe { row },
                ..
            } => Some(*row),
            _ => None,
        })
        .max();
    assert_eq!(last_on_first, Some(expected_break - 1));

    let second = &laid_out.pages[1].commands;
    assert!(matches!(
        second[0],
        DrawCommand::FilledRect {
            role: FillRole::TableHeader,
            ..
        }
    ));
    let labels: Vec<&str> = second[1..5].iter().filter_map(DrawCommand::text).collect();
    assert_eq!(labels, ["Description", "Qty", "Unit Price", "Total"]);
    assert!(matches!(
        second[5],
        DrawCommand::FilledRect {
            role: FillRole::RowStripe { row },
            ..
        } if row == expected_break
    ));
}

#[test]
fn quotation_without_items_still_totals() {
    let doc = DocumentModel::quotation(company(), contact());
    let laid_out = layout(&doc);
    assert_sound(&laid_out);

    let roles: Vec<FillRole> = laid_out
        .commands()
        .filter_map(|cmd| match cmd {
            DrawCommand::FilledRect { role, .. } => Some(*role),
            _ => None,
        })
        .collect();
    assert!(roles.contains(&FillRole::TableHeader));
    assert!(!roles.iter().any(|role| matches!(role, FillRole::RowStripe { .. })));

    let texts: Vec<&str> = laid_out.commands().filter_map(DrawCommand::text).collect();
    for label in ["Subtotal", "Discount (0%)", "VAT (0%)", "Total"] {
        // "Total" is also a header label; only the totals line has a value after it.
        let valued = texts
            .windows(2)
            .any(|pair| pair[0] == label && pair[1] == "0.00 EGP");
        assert!(valued, "{label} is not followed by 0.00 EGP in {texts:?}");
    }
}

#[test]
fn oversized_row_is_split_across_pages() {
    let description = "word ".repeat(1000);
    let doc = DocumentModel::quotation(company(), contact())
        .with_items(vec![LineItem::new(description, 7.0, 3.0)]);
    let laid_out = layout(&doc);
    assert_sound(&laid_out);

    let pages_with_row: Vec<usize> = laid_out
        .commands()
        .filter_map(|cmd| match cmd {
            DrawCommand::FilledRect {
                role: FillRole::RowStripe { row: 0 },
                page,
                ..
            } => Some(*page),
            _ => None,
        })
        .collect();
    assert!(pages_with_row.len() >= 2, "row drawn on {pages_with_row:?}");

    // Numeric cells are drawn once, on the row's first segment.
    let quantity_cells = laid_out
        .commands()
        .filter(|cmd| cmd.text() == Some("3"))
        .count();
    assert_eq!(quantity_cells, 1);
}

#[test]
fn long_notes_flow_across_pages() {
    let notes = "All equipment remains the property of the seller until paid in full. ".repeat(200);
    let doc = DocumentModel::quotation(company(), contact())
        .with_items(items(5))
        .with_notes(notes);
    let laid_out = layout(&doc);
    assert!(laid_out.page_count() >= 2);
    assert_sound(&laid_out);
}

#[test]
fn empty_document_still_gets_its_footer() {
    let doc = DocumentModel::proposal(Company::default(), Contact::default(), None, false);
    let laid_out = layout(&doc);
    assert_eq!(laid_out.page_count(), 1);
    assert_eq!(laid_out.pages[0].footer_count(), 1);
    assert_sound(&laid_out);
}

#[test]
fn proposal_with_breakdown_and_attachments() {
    let doc = DocumentModel::proposal(
        company(),
        contact(),
        Some("Phase one covers the core network.\n\nPhase two adds monitoring.".to_string()),
        true,
    )
    .with_subject("Network rollout")
    .with_items(items(4))
    .with_discount(DiscountPolicy::fixed(50.0))
    .with_tax(true)
    .with_attachments(vec![
        AttachmentRef::new("floor-plan.pdf", Some(2_621_440)),
        AttachmentRef::new("scope.docx", None),
    ]);
    let laid_out = layout(&doc);
    assert_sound(&laid_out);
    let all_text: Vec<&str> = laid_out.commands().filter_map(DrawCommand::text).collect();
    assert!(all_text.contains(&"PROPOSAL"));
    assert!(all_text.contains(&"Cost Breakdown"));
    assert!(all_text.contains(&"Discount (fixed)"));
    assert!(all_text.contains(&"\u{2022} floor-plan.pdf (2.5 MB)"));
    assert!(all_text.contains(&"\u{2022} scope.docx"));
}

#[test]
fn real_font_metrics_keep_the_same_guarantees() {
    let doc = DocumentModel::quotation(company(), contact()).with_items(items(90));
    let laid_out = LayoutEngine::default()
        .run(&doc, &PageGeometry::letter(), &FontMeasurer::default())
        .expect("layout");
    assert_sound(&laid_out);
}

#[test]
fn json_snapshot_lays_out_like_the_built_model() {
    let json = r#"{
        "documentType": "Quotation",
        "company": {"name": "Nile Systems"},
        "contact": {"name": "Mona Adel"},
        "subject": "Cabling",
        "items": [
            {"description": "Cat6 cable", "unitPrice": "2.5", "quantity": "300"},
            {"description": "Patch panel", "unitPrice": 80, "quantity": 2}
        ],
        "taxEnabled": true
    }"#;
    let from_json = DocumentModel::from_json_str(json).expect("model");
    let built = DocumentModel::quotation(Company::named("Nile Systems"), Contact::named("Mona Adel"))
        .with_subject("Cabling")
        .with_items(vec![
            LineItem::new("Cat6 cable", 2.5, 300.0),
            LineItem::new("Patch panel", 80.0, 2.0),
        ])
        .with_tax(true);
    assert_eq!(
        layout(&from_json).fingerprint_sha256(),
        layout(&built).fingerprint_sha256()
    );
}

#[test]
fn outline_of_a_real_layout_passes_strict_mode() {
    let doc = DocumentModel::quotation(company(), contact()).with_items(items(40));
    let laid_out = layout(&doc);
    let outline = OutlineRenderer::strict().render(&laid_out).expect("outline");
    assert!(outline.starts_with("page 1 of "));
    assert_eq!(
        outline.lines().filter(|line| line.starts_with("page ")).count(),
        laid_out.page_count()
    );
}

#[test]
fn non_finite_discount_is_invalid_input() {
    let doc = DocumentModel::quotation(company(), contact())
        .with_items(items(2))
        .with_discount(DiscountPolicy::percent(f64::NAN));
    let err = match LayoutEngine::default().run(&doc, &PageGeometry::a4(), &FixedWidthMeasurer::default()) {
        Ok(_) => panic!("NaN discount should be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, DocFlowError::InvalidInput(_)));
}
