use crate::cancel::CancelToken;
use crate::command::{Canvas, FillRole, LaidOutDocument};
use crate::config::LayoutConfig;
use crate::debug::DebugLogger;
use crate::error::DocFlowError;
use crate::frame::Frame;
use crate::geometry::PageGeometry;
use crate::measure::TextMeasurer;
use crate::model::{DiscountKind, DocumentKind, DocumentModel, LineItem};
use crate::style::{TextAlign, TextStyle};
use crate::totals::{Totals, compute_totals, format_percent, format_quantity};
use crate::types::{Pt, Rect};
use serde_json::json;

/// Called right after a page break, before the pending content is placed.
type ContinuationHook<'h, 'a> = &'h dyn Fn(&mut LayoutRun<'a>);

#[derive(Debug, Clone, Default)]
pub(crate) struct RunStats {
    pub page_breaks: usize,
    /// Table rows started on each page, indexed by page number - 1.
    pub rows_per_page: Vec<usize>,
}

/// Table column boxes, left to right: description, quantity, unit price,
/// line total.
#[derive(Debug, Clone, Copy)]
struct TableColumns {
    left: Pt,
    description: Pt,
    quantity: Pt,
    unit_price: Pt,
    line_total: Pt,
}

impl TableColumns {
    fn new(geometry: &PageGeometry, fractions: [f32; 4]) -> Self {
        let content = geometry.content_width();
        let [description, quantity, unit_price, line_total] = fractions.map(|f| content * f);
        Self {
            left: geometry.content_left(),
            description,
            quantity,
            unit_price,
            line_total,
        }
    }

    fn width(&self) -> Pt {
        self.description + self.quantity + self.unit_price + self.line_total
    }

    fn right(&self) -> Pt {
        self.left + self.width()
    }

    fn quantity_left(&self) -> Pt {
        self.left + self.description
    }

    fn quantity_center(&self) -> Pt {
        self.quantity_left() + self.quantity / 2
    }

    fn unit_price_right(&self) -> Pt {
        self.quantity_left() + self.quantity + self.unit_price
    }
}

#[derive(Debug, Clone)]
struct PlacedLine {
    text: String,
    style: TextStyle,
    height: Pt,
}

/// Description cell of one row after wrapping.
#[derive(Debug, Clone)]
struct RowLayout {
    lines: Vec<PlacedLine>,
    height: Pt,
}

/// Mutable state of one `run`: the cursor and the command recorder. Dropped
/// when the run returns; nothing survives between runs.
pub(crate) struct LayoutRun<'a> {
    doc: &'a DocumentModel,
    geometry: PageGeometry,
    config: &'a LayoutConfig,
    measurer: &'a dyn TextMeasurer,
    cancel: Option<&'a CancelToken>,
    debug: Option<&'a DebugLogger>,
    doc_id: Option<usize>,
    frame: Frame,
    canvas: Canvas,
    stats: RunStats,
}

impl<'a> LayoutRun<'a> {
    pub(crate) fn new(
        doc: &'a DocumentModel,
        geometry: PageGeometry,
        config: &'a LayoutConfig,
        measurer: &'a dyn TextMeasurer,
    ) -> Self {
        Self {
            doc,
            geometry,
            config,
            measurer,
            cancel: None,
            debug: None,
            doc_id: None,
            frame: Frame::new(geometry),
            canvas: Canvas::new(geometry),
            stats: RunStats {
                page_breaks: 0,
                rows_per_page: vec![0],
            },
        }
    }

    pub(crate) fn with_cancel(mut self, cancel: Option<&'a CancelToken>) -> Self {
        self.cancel = cancel;
        self
    }

    pub(crate) fn with_debug(mut self, debug: Option<&'a DebugLogger>, doc_id: Option<usize>) -> Self {
        self.debug = debug;
        self.doc_id = doc_id;
        self
    }

    /// Lays out the whole document and closes the last page.
    pub(crate) fn run(mut self) -> Result<(LaidOutDocument, RunStats), DocFlowError> {
        self.check_capacity()?;
        let doc = self.doc;
        let config = self.config;

        self.render_letterhead();
        self.render_parties();
        if let DocumentKind::Proposal {
            proposal_body: Some(body),
            ..
        } = &doc.kind
        {
            self.render_proposal_body(body);
        }
        if doc.kind.shows_breakdown() {
            if matches!(doc.kind, DocumentKind::Proposal { .. }) {
                let heading = self.heading_style();
                self.add_text(
                    &config.labels.breakdown,
                    self.geometry.content_left(),
                    &heading,
                    TextAlign::Left,
                    self.geometry.content_width(),
                );
            }
            let columns = TableColumns::new(&self.geometry, config.table.column_fractions);
            self.render_table(&doc.items, columns)?;
            let totals = compute_totals(&doc.items, &doc.discount, doc.tax_enabled, &config.tax);
            self.render_totals_block(&totals, columns);
        }
        self.add_section(&config.labels.notes, doc.notes.as_deref().unwrap_or(""));
        self.add_section(&config.labels.terms, doc.terms.as_deref().unwrap_or(""));
        self.render_attachments();

        self.finalize();
        let stats = self.stats;
        Ok((self.canvas.finish(), stats))
    }

    /// Rejects pages too short to hold the tallest unsplittable unit: the
    /// table header with one row, or a title line.
    fn check_capacity(&self) -> Result<(), DocFlowError> {
        let table = &self.config.table;
        let title = self.line_height(&self.title_style());
        let needed = (table.header_height + table.row_height).max(title);
        let usable = self.geometry.usable_height();
        if usable < needed {
            return Err(DocFlowError::invalid(format!(
                "page leaves {}pt for content, at least {}pt needed",
                usable.to_f32(),
                needed.to_f32()
            )));
        }
        Ok(())
    }

    // --- primitives -----------------------------------------------------

    /// Breaks to a new page when `needed` does not fit above the footer band,
    /// then runs `hook` on the fresh page.
    fn ensure_space(&mut self, needed: Pt, reason: &'static str, hook: Option<ContinuationHook<'_, 'a>>) {
        if self.frame.fits(needed) {
            return;
        }
        if self.frame.is_at_page_top() {
            // A fresh page cannot do better; keep going rather than emit blanks.
            log::warn!(
                "{reason}: {}pt exceeds an empty page on page {}",
                needed.to_f32(),
                self.frame.page()
            );
            return;
        }
        self.break_page(reason);
        if let Some(hook) = hook {
            hook(self);
        }
    }

    fn break_page(&mut self, reason: &'static str) {
        let from_page = self.frame.page();
        self.emit_footer();
        self.canvas.show_page();
        self.frame.next_page();
        self.stats.page_breaks += 1;
        self.stats.rows_per_page.push(0);
        log::debug!("page break {from_page} -> {} ({reason})", self.frame.page());
        if let Some(logger) = self.debug {
            logger.log_event(&json!({
                "type": "layout.page_break",
                "doc_id": self.doc_id,
                "reason": reason,
                "from_page": from_page,
                "to_page": self.frame.page(),
            }));
            logger.increment("layout.page_break", 1);
        }
    }

    fn emit_footer(&mut self) {
        let footer = &self.config.footer;
        let style = self.config.regular(self.config.sizes.footer, self.config.palette.muted);
        let rule = footer.rule.then_some(self.config.palette.rule);
        self.canvas
            .footer(&footer.message, &footer.page_label, &style, rule);
    }

    /// Wraps `text` to `max_width` and places it line by line, breaking pages
    /// as needed. Blank text takes no space at all.
    fn add_text(&mut self, text: &str, x: Pt, style: &TextStyle, align: TextAlign, max_width: Pt) {
        if text.trim().is_empty() {
            return;
        }
        let line_height = self.line_height(style);
        let lines = self
            .measurer
            .wrap(text, max_width, style.font_size, &style.font_name);
        for line in lines {
            self.ensure_space(line_height, "text", None);
            if !line.is_empty() {
                let width = self.measure(&line, style);
                self.canvas
                    .draw_text(x, self.frame.y(), line, style, align, width, line_height);
            }
            self.frame.advance(line_height);
        }
    }

    fn add_gap(&mut self, height: Pt) {
        if !self.frame.is_at_page_top() {
            self.frame.advance(height);
        }
    }

    fn line_height(&self, style: &TextStyle) -> Pt {
        self.measurer.line_height(style.font_size, &style.font_name)
    }

    fn measure(&self, text: &str, style: &TextStyle) -> Pt {
        self.measurer
            .text_width(text, style.font_size, &style.font_name)
    }

    fn wrap_lines(&self, paragraphs: &[(String, TextStyle)], max_width: Pt) -> Vec<PlacedLine> {
        let mut out = Vec::new();
        for (text, style) in paragraphs {
            if text.trim().is_empty() {
                continue;
            }
            let height = self.line_height(style);
            for line in self
                .measurer
                .wrap(text, max_width, style.font_size, &style.font_name)
            {
                out.push(PlacedLine {
                    text: line,
                    style: style.clone(),
                    height,
                });
            }
        }
        out
    }

    fn draw_line_at(&mut self, line: &PlacedLine, x: Pt, y: Pt, align: TextAlign) {
        if line.text.is_empty() {
            return;
        }
        let width = self.measure(&line.text, &line.style);
        self.canvas
            .draw_text(x, y, line.text.clone(), &line.style, align, width, line.height);
    }

    // --- styles ---------------------------------------------------------

    fn title_style(&self) -> TextStyle {
        self.config
            .bold(self.config.sizes.title, self.config.palette.accent)
    }

    fn heading_style(&self) -> TextStyle {
        self.config
            .bold(self.config.sizes.heading, self.config.palette.accent)
    }

    fn body_style(&self) -> TextStyle {
        self.config
            .regular(self.config.sizes.body, self.config.palette.text)
    }

    fn strong_style(&self) -> TextStyle {
        self.config.bold(self.config.sizes.body, self.config.palette.text)
    }

    fn muted_style(&self) -> TextStyle {
        self.config
            .regular(self.config.sizes.body, self.config.palette.muted)
    }

    // --- sections -------------------------------------------------------

    /// Company block on the left, document title and reference on the right.
    fn render_letterhead(&mut self) {
        let doc = self.doc;
        let labels = &self.config.labels;
        let muted = self.muted_style();

        let mut left = vec![(doc.company.name.clone(), self.title_style())];
        for detail in [
            doc.company.address.as_deref(),
            doc.company.phone.as_deref(),
            doc.company.email.as_deref(),
            doc.company.website.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            left.push((detail.to_string(), muted.clone()));
        }
        if let Some(tax_id) = doc.company.tax_id.as_deref().filter(|v| !v.trim().is_empty()) {
            left.push((format!("Tax ID: {tax_id}"), muted.clone()));
        }

        let title = match doc.kind {
            DocumentKind::Quotation => labels.quotation_title.clone(),
            DocumentKind::Proposal { .. } => labels.proposal_title.clone(),
        };
        let mut right = vec![(title, self.title_style())];
        if let Some(reference) = doc.reference.as_deref().filter(|v| !v.trim().is_empty()) {
            right.push((format!("{}: {reference}", labels.reference), muted.clone()));
        }
        if let Some(date) = doc.issue_date.as_deref().filter(|v| !v.trim().is_empty()) {
            right.push((format!("{}: {date}", labels.date), muted));
        }

        self.add_two_columns(&left, &right);
        self.add_gap(Pt::from_i32(6));
        self.ensure_space(Pt::from_i32(2), "rule", None);
        let y = self.frame.y();
        self.canvas.line(
            self.geometry.content_left(),
            y,
            self.geometry.content_right(),
            y,
            Pt::from_f32(1.5),
            self.config.palette.accent,
        );
        self.add_gap(self.config.section_gap);
    }

    /// Two side-by-side blocks kept together when they fit on one page;
    /// otherwise they flow one after the other.
    fn add_two_columns(&mut self, left: &[(String, TextStyle)], right: &[(String, TextStyle)]) {
        let content = self.geometry.content_width();
        let left_width = content.mul_ratio(3, 5);
        let right_width = content - left_width - Pt::from_i32(12);
        let left_lines = self.wrap_lines(left, left_width);
        let right_lines = self.wrap_lines(right, right_width);
        let left_height: Pt = left_lines.iter().map(|line| line.height).sum();
        let right_height: Pt = right_lines.iter().map(|line| line.height).sum();
        let height = left_height.max(right_height);
        if height == Pt::ZERO {
            return;
        }

        let x_left = self.geometry.content_left();
        let x_right = self.geometry.content_right();
        if height <= self.geometry.usable_height() {
            self.ensure_space(height, "header_block", None);
            let top = self.frame.y();
            let mut y = top;
            for line in &left_lines {
                self.draw_line_at(line, x_left, y, TextAlign::Left);
                y += line.height;
            }
            let mut y = top;
            for line in &right_lines {
                self.draw_line_at(line, x_right, y, TextAlign::Right);
                y += line.height;
            }
            self.frame.advance(height);
            return;
        }

        let flowing = left_lines
            .iter()
            .map(|line| (line, x_left, TextAlign::Left))
            .chain(right_lines.iter().map(|line| (line, x_right, TextAlign::Right)));
        for (line, x, align) in flowing {
            self.ensure_space(line.height, "header_block", None);
            self.draw_line_at(line, x, self.frame.y(), align);
            self.frame.advance(line.height);
        }
    }

    fn render_parties(&mut self) {
        let doc = self.doc;
        let config = self.config;
        let labels = &config.labels;
        let left = self.geometry.content_left();
        let width = self.geometry.content_width();
        let heading = self.heading_style();
        let strong = self.strong_style();
        let body = self.body_style();

        let contact = &doc.contact;
        let has_contact = !contact.name.trim().is_empty()
            || contact.company.as_deref().is_some_and(|c| !c.trim().is_empty());
        if has_contact {
            let first = self.line_height(&heading) + self.line_height(&strong);
            self.ensure_space(first, "parties", None);
            self.add_text(&labels.prepared_for, left, &heading, TextAlign::Left, width);
            self.add_text(&contact.name, left, &strong, TextAlign::Left, width);
            for detail in [
                contact.company.as_deref(),
                contact.email.as_deref(),
                contact.phone.as_deref(),
                contact.address.as_deref(),
            ]
            .into_iter()
            .flatten()
            {
                self.add_text(detail, left, &body, TextAlign::Left, width);
            }
            self.add_gap(config.section_gap / 2);
        }

        if !doc.subject.trim().is_empty() {
            let subject = format!("{}: {}", labels.subject, doc.subject.trim());
            self.add_text(&subject, left, &strong, TextAlign::Left, width);
        }
        self.add_gap(self.config.section_gap);
    }

    fn render_proposal_body(&mut self, body: &str) {
        let left = self.geometry.content_left();
        let width = self.geometry.content_width();
        let style = self.body_style();
        let paragraph_gap = self.line_height(&style) / 2;
        let mut placed_any = false;
        for paragraph in body.split("\n\n") {
            if paragraph.trim().is_empty() {
                continue;
            }
            self.add_text(paragraph.trim(), left, &style, TextAlign::Left, width);
            self.add_gap(paragraph_gap);
            placed_any = true;
        }
        if placed_any {
            self.add_gap(self.config.section_gap);
        }
    }

    /// Heading plus wrapped body; nothing at all when the body is blank.
    fn add_section(&mut self, title: &str, body: &str) {
        if body.trim().is_empty() {
            return;
        }
        let left = self.geometry.content_left();
        let width = self.geometry.content_width();
        let heading = self.heading_style();
        let style = self.body_style();
        // Keep the heading with the first body line.
        let first = self.line_height(&heading) + self.line_height(&style);
        self.ensure_space(first, "section", None);
        self.add_text(title, left, &heading, TextAlign::Left, width);
        self.add_text(body.trim(), left, &style, TextAlign::Left, width);
        self.add_gap(self.config.section_gap);
    }

    fn render_attachments(&mut self) {
        let doc = self.doc;
        let attachments = &doc.attachments;
        if attachments.is_empty() {
            return;
        }
        let left = self.geometry.content_left();
        let width = self.geometry.content_width();
        let heading = self.heading_style();
        let style = self.body_style();
        let first = self.line_height(&heading) + self.line_height(&style);
        self.ensure_space(first, "section", None);
        let title = self.config.labels.attachments.clone();
        self.add_text(&title, left, &heading, TextAlign::Left, width);
        for attachment in attachments {
            let line = match attachment.size_bytes {
                Some(size) => format!("\u{2022} {} ({})", attachment.name, format_size(size)),
                None => format!("\u{2022} {}", attachment.name),
            };
            self.add_text(&line, left, &style, TextAlign::Left, width);
        }
        self.add_gap(self.config.section_gap);
    }

    // --- table ----------------------------------------------------------

    fn render_table(&mut self, items: &'a [LineItem], columns: TableColumns) -> Result<(), DocFlowError> {
        let table = self.config.table;
        let usable = self.geometry.usable_height();
        let row_capacity = usable - table.header_height;
        let repeat_header = move |run: &mut LayoutRun<'a>| run.draw_table_header(columns);

        // Never leave the header alone at the bottom of a page.
        let first_row = items
            .first()
            .map(|item| self.row_layout(item, columns).height)
            .unwrap_or(Pt::ZERO)
            .min(row_capacity);
        self.ensure_space(table.header_height + first_row, "table_header", None);
        self.draw_table_header(columns);

        for (index, item) in items.iter().enumerate() {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                log::debug!("layout cancelled before row {index}");
                return Err(DocFlowError::Cancelled { rows_placed: index });
            }
            let row = self.row_layout(item, columns);
            if row.height <= row_capacity {
                self.ensure_space(row.height, "table_row", Some(&repeat_header));
                self.draw_row_segment(index, item, &row.lines, row.height, columns, true);
            } else {
                self.draw_oversized_row(index, item, &row, columns, &repeat_header);
            }
            if let Some(count) = self.stats.rows_per_page.last_mut() {
                *count += 1;
            }
            if let Some(logger) = self.debug {
                logger.increment("layout.rows", 1);
            }
        }
        Ok(())
    }

    fn draw_table_header(&mut self, columns: TableColumns) {
        let table = self.config.table;
        let config = self.config;
        let labels = &config.labels;
        let top = self.frame.y();
        self.canvas.fill_rect(
            Rect {
                x: columns.left,
                y: top,
                width: columns.width(),
                height: table.header_height,
            },
            table.header_fill,
            FillRole::TableHeader,
        );
        let style = self
            .config
            .bold(self.config.sizes.body, table.header_text);
        let line_height = self.line_height(&style);
        let y = top + ((table.header_height - line_height) / 2).max(Pt::ZERO);
        let pad = table.cell_padding;
        let cells = [
            (labels.description.clone(), columns.left + pad, TextAlign::Left),
            (labels.quantity.clone(), columns.quantity_center(), TextAlign::Center),
            (labels.unit_price.clone(), columns.unit_price_right() - pad, TextAlign::Right),
            (labels.line_total.clone(), columns.right() - pad, TextAlign::Right),
        ];
        for (text, x, align) in cells {
            let width = self.measure(&text, &style);
            self.canvas
                .draw_text(x, y, text, &style, align, width, line_height);
        }
        self.frame.advance(table.header_height);
    }

    fn vertical_padding(&self) -> Pt {
        let body = self.line_height(&self.body_style());
        ((self.config.table.row_height - body) / 2).max(Pt::ZERO)
    }

    fn row_layout(&self, item: &LineItem, columns: TableColumns) -> RowLayout {
        let max_width = (columns.description - self.config.table.cell_padding * 2).max(Pt::from_i32(1));
        let primary = self.strong_style();
        let detail = self
            .config
            .regular(self.config.sizes.detail, self.config.palette.muted);
        let mut paragraphs = vec![(item.description.clone(), primary)];
        if let Some(text) = item.detail.as_deref() {
            paragraphs.push((text.to_string(), detail));
        }
        let lines = self.wrap_lines(&paragraphs, max_width);
        let text_height: Pt = lines.iter().map(|line| line.height).sum();
        let height = (text_height + self.vertical_padding() * 2).max(self.config.table.row_height);
        RowLayout { lines, height }
    }

    /// Draws one page's worth of a row: stripe, description lines and, on the
    /// first segment, the numeric cells.
    fn draw_row_segment(
        &mut self,
        index: usize,
        item: &LineItem,
        lines: &[PlacedLine],
        height: Pt,
        columns: TableColumns,
        with_numbers: bool,
    ) {
        let table = self.config.table;
        let top = self.frame.y();
        let stripe = if index % 2 == 0 {
            table.stripe_even
        } else {
            table.stripe_odd
        };
        self.canvas.fill_rect(
            Rect {
                x: columns.left,
                y: top,
                width: columns.width(),
                height,
            },
            stripe,
            FillRole::RowStripe { row: index },
        );

        let pad = table.cell_padding;
        let text_top = top + self.vertical_padding();
        let mut y = text_top;
        for line in lines {
            self.draw_line_at(line, columns.left + pad, y, TextAlign::Left);
            y += line.height;
        }

        if with_numbers {
            let style = self.body_style();
            let line_height = self.line_height(&style);
            let money = &self.config.money;
            let cells = [
                (format_quantity(item.quantity()), columns.quantity_center(), TextAlign::Center),
                (money.format(item.unit_price()), columns.unit_price_right() - pad, TextAlign::Right),
                (money.format(item.line_total()), columns.right() - pad, TextAlign::Right),
            ];
            for (text, x, align) in cells {
                let width = self.measure(&text, &style);
                self.canvas
                    .draw_text(x, text_top, text, &style, align, width, line_height);
            }
        }

        if let Some(rule) = table.row_rule {
            let bottom = top + height;
            self.canvas
                .line(columns.left, bottom, columns.right(), bottom, Pt::from_f32(0.5), rule);
        }
        self.frame.advance(height);
    }

    /// A row taller than a whole page is split between description lines,
    /// repeating the header and keeping its stripe on every page it spans.
    fn draw_oversized_row(
        &mut self,
        index: usize,
        item: &LineItem,
        row: &RowLayout,
        columns: TableColumns,
        repeat_header: ContinuationHook<'_, 'a>,
    ) {
        let vpad = self.vertical_padding();
        let mut remaining: &[PlacedLine] = &row.lines;
        let mut first = true;
        while let Some(head) = remaining.first() {
            self.ensure_space(head.height + vpad * 2, "table_row", Some(repeat_header));
            let available = self.frame.remaining_height() - vpad * 2;
            let mut used = Pt::ZERO;
            let mut count = 0;
            for line in remaining {
                if count > 0 && used + line.height > available {
                    break;
                }
                used += line.height;
                count += 1;
            }
            let (segment, rest) = remaining.split_at(count);
            self.draw_row_segment(index, item, segment, used + vpad * 2, columns, first);
            remaining = rest;
            first = false;
        }
    }

    // --- totals ---------------------------------------------------------

    fn render_totals_block(&mut self, totals: &Totals, columns: TableColumns) {
        let config = self.config;
        let labels = &config.labels;
        let money = &config.money;
        let body = self.body_style();
        let strong = self.config.bold(config.sizes.heading, config.palette.accent);
        let body_height = self.line_height(&body);
        let total_height = self.line_height(&strong);
        let separator_gap = Pt::from_i32(6);
        let top_gap = Pt::from_i32(8);
        let block = top_gap + body_height * 3 + separator_gap + total_height;

        if block <= self.geometry.usable_height() {
            self.ensure_space(block, "totals", None);
        }
        self.add_gap(top_gap);

        let doc = self.doc;
        let discount = &doc.discount;
        let discount_label = match discount.kind {
            DiscountKind::Percent => {
                format!("{} ({})", labels.discount, format_percent(discount.value))
            }
            DiscountKind::Fixed => format!("{} ({})", labels.discount, labels.fixed_discount),
        };
        let rate = if doc.tax_enabled {
            config.tax.rate_percent()
        } else {
            0.0
        };
        let tax_label = format!("{} ({})", labels.tax, format_percent(rate));

        let label_x = columns.quantity_left() + config.table.cell_padding;
        let value_x = columns.right() - config.table.cell_padding;
        let rows = [
            (labels.subtotal.clone(), money.format(totals.subtotal)),
            (discount_label, money.format(-totals.discount_value)),
            (tax_label, money.format(totals.tax)),
        ];
        for (label, value) in rows {
            self.add_label_value(&label, &value, label_x, value_x, &body);
        }

        self.ensure_space(separator_gap + total_height, "totals", None);
        let rule_y = self.frame.y() + separator_gap / 2;
        self.canvas.line(
            columns.quantity_left(),
            rule_y,
            columns.right(),
            rule_y,
            Pt::from_i32(1),
            config.palette.accent,
        );
        self.frame.advance(separator_gap);
        self.add_label_value(
            &labels.total,
            &money.format(totals.total),
            label_x,
            value_x,
            &strong,
        );
        self.add_gap(config.section_gap);
    }

    fn add_label_value(&mut self, label: &str, value: &str, label_x: Pt, value_x: Pt, style: &TextStyle) {
        let height = self.line_height(style);
        self.ensure_space(height, "totals", None);
        let y = self.frame.y();
        let label_width = self.measure(label, style);
        let value_width = self.measure(value, style);
        self.canvas
            .draw_text(label_x, y, label, style, TextAlign::Left, label_width, height);
        self.canvas
            .draw_text(value_x, y, value, style, TextAlign::Right, value_width, height);
        self.frame.advance(height);
    }

    /// Footer for the page still open. Runs once per document whatever the
    /// number of breaks, even when the page holds nothing else.
    fn finalize(&mut self) {
        self.emit_footer();
        log::trace!(
            "finalized page {} with {} commands",
            self.canvas.page_number(),
            self.canvas.current_command_count()
        );
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
