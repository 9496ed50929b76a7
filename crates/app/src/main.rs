//! Demo driver: edit a draft, submit it, export `factura.pdf`.

use anyhow::Context;
use tracing::info;

use factura_app::{Session, telemetry};
use factura_model::{ClientField, Edit, ItemField, MetaField};
use factura_render::CompanyProfile;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let output_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| ".".to_string());

    let mut session = Session::new(CompanyProfile::default(), &output_dir);
    session.start();

    let item = session.invoice().items[0].id;
    session.apply(Edit::Client(ClientField::Name, "Comercial Andina Ltda.".into()));
    session.apply(Edit::Client(ClientField::TaxId, "76.543.210-K".into()));
    session.apply(Edit::Item(item, ItemField::Description, "Servicio de consultoría".into()));
    session.apply(Edit::Item(item, ItemField::Quantity, "2".into()));
    session.apply(Edit::Item(item, ItemField::UnitPrice, "1000".into()));
    session.apply(Edit::Meta(MetaField::Discount, "10".into()));
    session.apply(Edit::Meta(
        MetaField::Notes,
        "Pago por transferencia.\nCuenta corriente 123-456-789.".into(),
    ));

    let totals = session.totals();
    info!(
        subtotal = totals.subtotal,
        discount = totals.discount_amount,
        tax = totals.tax_amount,
        total = totals.total,
        "draft totals"
    );

    session.submit();

    let path = session
        .export_pdf()
        .await
        .context("exporting the invoice document")?;
    info!(path = %path.display(), "document ready");
    Ok(())
}
