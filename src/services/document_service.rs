// src/services/document_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Element};

use crate::{
    common::{error::AppError, timestamps},
    models::sale::{CustomerView, SaleStatus, SaleView},
};

const DEFAULT_BUSINESS_NAME: &str = "Sales Manager";

/// Venda concluída gera recibo; qualquer outra, remito (nota de entrega).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptKind {
    Receipt,
    DeliveryNote,
}

impl ReceiptKind {
    pub fn for_status(status: SaleStatus) -> Self {
        match status {
            SaleStatus::Completed => ReceiptKind::Receipt,
            _ => ReceiptKind::DeliveryNote,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReceiptKind::Receipt => "Receipt",
            ReceiptKind::DeliveryNote => "Delivery note",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            ReceiptKind::Receipt => "Receipt",
            ReceiptKind::DeliveryNote => "Delivery-note",
        }
    }
}

/// Número impresso: os seis últimos caracteres do id, com zeros à esquerda.
pub fn receipt_number(sale_id: &str) -> String {
    let chars: Vec<char> = sale_id.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    format!("{:0>6}", tail)
}

/// Nome sugerido para o download, ex: `Ana-Receipt-00a1b2.pdf`.
pub fn receipt_file_name(sale: &SaleView) -> String {
    let kind = ReceiptKind::for_status(sale.status);
    let customer: String = sale
        .customer
        .name()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}-{}-{}.pdf", customer, kind.slug(), receipt_number(&sale.id))
}

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
    font_family: String,
}

impl DocumentService {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: impl Into<String>) -> Self {
        Self { fonts_dir: fonts_dir.into(), font_family: font_family.into() }
    }

    pub fn render_receipt(
        &self,
        sale: &SaleView,
        business_name: Option<&str>,
    ) -> Result<Vec<u8>, AppError> {
        // 1. Fonte
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)
            .map_err(|e| {
                AppError::Document(format!(
                    "fonte {} não encontrada em {}: {}",
                    self.font_family,
                    self.fonts_dir.display(),
                    e
                ))
            })?;

        let kind = ReceiptKind::for_status(sale.status);
        let number = receipt_number(&sale.id);

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("{} #{}", kind.title(), number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        let title_text = business_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_BUSINESS_NAME);
        doc.push(
            elements::Paragraph::new(title_text)
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("{} No. {}", kind.title(), number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        let issued = sale
            .created_at
            .as_deref()
            .or(sale.date.as_deref())
            .and_then(timestamps::parse_str);
        if let Some(issued) = issued {
            doc.push(elements::Paragraph::new(format!("Date: {}", issued.format("%d/%m/%Y %H:%M"))));
        }

        doc.push(elements::Break::new(1));

        // --- CLIENTE ---
        doc.push(elements::Paragraph::new("Customer").styled(style::Style::new().bold()));
        doc.push(elements::Paragraph::new(sale.customer.name()));
        if let CustomerView::Known(customer) = &sale.customer {
            for line in [&customer.email, &customer.phone].into_iter().flatten() {
                doc.push(elements::Paragraph::new(line.as_str()).styled(style::Style::new().with_font_size(10)));
            }
        }

        doc.push(elements::Break::new(2));

        // --- TABELA DE ITENS ---
        // Pesos das colunas: Produto (4), Qtd (1), Unitário (2), Subtotal (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Product").styled(style_bold))
            .element(elements::Paragraph::new("Qty").styled(style_bold))
            .element(elements::Paragraph::new("Price").styled(style_bold))
            .element(elements::Paragraph::new("Subtotal").styled(style_bold))
            .push()
            .map_err(table_error)?;

        for item in &sale.items {
            table
                .row()
                .element(elements::Paragraph::new(item.product.name()))
                .element(elements::Paragraph::new(item.quantity.to_string()))
                .element(elements::Paragraph::new(format!("$ {:.2}", item.price)))
                .element(elements::Paragraph::new(format!("$ {:.2}", item.subtotal)))
                .push()
                .map_err(table_error)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAL ---
        let mut total_paragraph = elements::Paragraph::new(format!("TOTAL: $ {:.2}", sale.total));
        total_paragraph.set_alignment(genpdf::Alignment::Right);
        doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

        // --- RODAPÉ ---
        doc.push(elements::Break::new(3));
        let mut footer = elements::Paragraph::new("Thank you for your purchase");
        footer.set_alignment(genpdf::Alignment::Center);
        doc.push(footer.styled(style::Style::new().italic().with_font_size(8)));

        // Renderiza em memória
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::Document(e.to_string()))?;

        Ok(buffer)
    }
}

fn table_error(e: genpdf::error::Error) -> AppError {
    AppError::Document(format!("tabela do recibo: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sale::UnknownCustomer;
    use rust_decimal::Decimal;

    fn sale(id: &str, status: SaleStatus) -> SaleView {
        SaleView {
            id: id.to_string(),
            client_id: None,
            customer: CustomerView::Unknown(UnknownCustomer { name: "Ana María".into() }),
            items: vec![],
            total: Decimal::ZERO,
            status,
            notes: None,
            date: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn number_is_last_six_chars_zero_padded() {
        assert_eq!(receipt_number("7f1c2a9e-1b7c-4a39-9d0e-3f7d2b8c5a11"), "8c5a11");
        assert_eq!(receipt_number("42"), "000042");
        assert_eq!(receipt_number(""), "000000");
    }

    #[test]
    fn kind_follows_status() {
        assert_eq!(ReceiptKind::for_status(SaleStatus::Completed), ReceiptKind::Receipt);
        assert_eq!(ReceiptKind::for_status(SaleStatus::Pending), ReceiptKind::DeliveryNote);
        assert_eq!(ReceiptKind::for_status(SaleStatus::Cancelled), ReceiptKind::DeliveryNote);
    }

    #[test]
    fn file_name_is_header_safe() {
        assert_eq!(
            receipt_file_name(&sale("abc123456", SaleStatus::Completed)),
            "Ana_Mar_a-Receipt-123456.pdf"
        );
        assert_eq!(
            receipt_file_name(&sale("9", SaleStatus::Pending)),
            "Ana_Mar_a-Delivery-note-000009.pdf"
        );
    }

    #[test]
    fn missing_fonts_are_a_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = DocumentService::new(dir.path(), "Roboto");
        let err = service.render_receipt(&sale("s1", SaleStatus::Pending), None).unwrap_err();
        assert!(matches!(err, AppError::Document(_)));
    }
}
