//! Catalog import row and the product → rows expansion
//!
//! Column names and order are a fixed contract with the downstream import
//! system; serde field order below is the CSV header order.

use serde::{Deserialize, Serialize};

use super::catalog_mapping::CategoryMapping;
use super::product::{NO_VARIANT, ProductRecord};

/// Short description limit imposed by the import platform
pub const SHORT_DESCRIPTION_MAX_CHARS: usize = 200;
/// Meta description limit imposed by the import platform
pub const META_DESCRIPTION_MAX_CHARS: usize = 160;

const YES: &str = "SIM";

/// One row per (product, variant) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    #[serde(rename = "_IDSKU")]
    pub sku_id: String,
    #[serde(rename = "_NomeSKU")]
    pub sku_name: String,
    #[serde(rename = "_AtivarSKUSePossível")]
    pub activate_sku_if_possible: String,
    #[serde(rename = "_SKUAtivo")]
    pub sku_active: String,
    #[serde(rename = "_EANSKU")]
    pub sku_ean: String,
    #[serde(rename = "_Altura")]
    pub height: String,
    #[serde(rename = "_AlturaReal")]
    pub real_height: String,
    #[serde(rename = "_Largura")]
    pub width: String,
    #[serde(rename = "_LarguraReal")]
    pub real_width: String,
    #[serde(rename = "_Comprimento")]
    pub length: String,
    #[serde(rename = "_ComprimentoReal")]
    pub real_length: String,
    #[serde(rename = "_Peso")]
    pub weight: String,
    #[serde(rename = "_PesoReal")]
    pub real_weight: String,
    #[serde(rename = "_UnidadeMedida")]
    pub unit_of_measure: String,
    #[serde(rename = "_MultiplicadorUnidade")]
    pub unit_multiplier: String,
    #[serde(rename = "_CodigoReferenciaSKU")]
    pub sku_reference_code: String,
    #[serde(rename = "_ValorFidelidade")]
    pub loyalty_value: String,
    #[serde(rename = "_DataPrevisaoChegada")]
    pub expected_arrival_date: String,
    #[serde(rename = "_CodigoFabricante")]
    pub manufacturer_code: String,
    #[serde(rename = "_IDProduto")]
    pub product_id: String,
    #[serde(rename = "_NomeProduto")]
    pub product_name: String,
    #[serde(rename = "_BreveDescricaoProduto")]
    pub short_description: String,
    #[serde(rename = "_ProdutoAtivo")]
    pub product_active: String,
    #[serde(rename = "_CodigoReferenciaProduto")]
    pub product_reference_code: String,
    #[serde(rename = "_MostrarNoSite")]
    pub show_on_site: String,
    #[serde(rename = "_LinkTexto")]
    pub link_text: String,
    #[serde(rename = "_DescricaoProduto")]
    pub description: String,
    #[serde(rename = "_DataLancamentoProduto")]
    pub launch_date: String,
    #[serde(rename = "_PalavrasChave")]
    pub keywords: String,
    #[serde(rename = "_TituloSite")]
    pub site_title: String,
    #[serde(rename = "_DescricaoMetaTag")]
    pub meta_description: String,
    #[serde(rename = "_IDFornecedor")]
    pub supplier_id: String,
    #[serde(rename = "_MostrarSemEstoque")]
    pub show_out_of_stock: String,
    #[serde(rename = "_Kit")]
    pub kit: String,
    #[serde(rename = "_IDDepartamento")]
    pub department_id: String,
    #[serde(rename = "_NomeDepartamento")]
    pub department_name: String,
    #[serde(rename = "_IDCategoria")]
    pub category_id: String,
    #[serde(rename = "_NomeCategoria")]
    pub category_name: String,
    #[serde(rename = "_IDMarca")]
    pub brand_id: String,
    #[serde(rename = "_Marca")]
    pub brand_name: String,
    #[serde(rename = "_PesoCubico")]
    pub cubic_weight: String,
    #[serde(rename = "_Preço")]
    pub price: String,
    #[serde(rename = "_BaseUrlImagens")]
    pub image_base_url: String,
    #[serde(rename = "_ImagensSalvas")]
    pub saved_images: String,
    #[serde(rename = "_ImagensURLs")]
    pub image_urls: String,
}

/// Header names in contract order
pub const OUTPUT_COLUMNS: [&str; 45] = [
    "_IDSKU",
    "_NomeSKU",
    "_AtivarSKUSePossível",
    "_SKUAtivo",
    "_EANSKU",
    "_Altura",
    "_AlturaReal",
    "_Largura",
    "_LarguraReal",
    "_Comprimento",
    "_ComprimentoReal",
    "_Peso",
    "_PesoReal",
    "_UnidadeMedida",
    "_MultiplicadorUnidade",
    "_CodigoReferenciaSKU",
    "_ValorFidelidade",
    "_DataPrevisaoChegada",
    "_CodigoFabricante",
    "_IDProduto",
    "_NomeProduto",
    "_BreveDescricaoProduto",
    "_ProdutoAtivo",
    "_CodigoReferenciaProduto",
    "_MostrarNoSite",
    "_LinkTexto",
    "_DescricaoProduto",
    "_DataLancamentoProduto",
    "_PalavrasChave",
    "_TituloSite",
    "_DescricaoMetaTag",
    "_IDFornecedor",
    "_MostrarSemEstoque",
    "_Kit",
    "_IDDepartamento",
    "_NomeDepartamento",
    "_IDCategoria",
    "_NomeCategoria",
    "_IDMarca",
    "_Marca",
    "_PesoCubico",
    "_Preço",
    "_BaseUrlImagens",
    "_ImagensSalvas",
    "_ImagensURLs",
];

/// SKU for a single variant row
pub fn variant_sku(sku: &str, variant: &str) -> String {
    if variant == NO_VARIANT {
        sku.to_string()
    } else {
        format!("{sku}_{variant}")
    }
}

/// Display name for a single variant row
pub fn variant_name(name: &str, variant: &str) -> String {
    if variant == NO_VARIANT {
        name.to_string()
    } else {
        format!("{name} - {variant}")
    }
}

/// Keep at most `max_chars` characters (not bytes)
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Expand one resolved product into its import rows, one per variant
///
/// `launch_date` is written verbatim (the caller formats it as `dd/mm/YYYY`).
pub fn expand_rows(
    record: &ProductRecord,
    mapping: &CategoryMapping,
    launch_date: &str,
) -> Vec<OutputRow> {
    let department_id = mapping.department_id(&record.department);
    let category_id = mapping.category_id(&record.category);
    let brand_id = mapping.brand_id(&record.brand);
    let short_description = truncate_chars(&record.description, SHORT_DESCRIPTION_MAX_CHARS);
    let meta_description = truncate_chars(&record.description, META_DESCRIPTION_MAX_CHARS);
    let saved_images = record.saved_images.join(";");
    let image_urls = record.images.join(";");

    record
        .variants
        .iter()
        .map(|variant| {
            let sku_id = variant_sku(&record.sku, variant);
            OutputRow {
                sku_reference_code: sku_id.clone(),
                sku_id,
                sku_name: variant_name(&record.name, variant),
                activate_sku_if_possible: YES.to_string(),
                sku_active: YES.to_string(),
                sku_ean: String::new(),
                height: String::new(),
                real_height: String::new(),
                width: String::new(),
                real_width: String::new(),
                length: String::new(),
                real_length: String::new(),
                weight: String::new(),
                real_weight: String::new(),
                unit_of_measure: "un".to_string(),
                unit_multiplier: "1,000000".to_string(),
                loyalty_value: String::new(),
                expected_arrival_date: String::new(),
                manufacturer_code: String::new(),
                product_id: record.sku.clone(),
                product_name: record.name.clone(),
                short_description: short_description.clone(),
                product_active: YES.to_string(),
                product_reference_code: record.sku.clone(),
                show_on_site: YES.to_string(),
                link_text: record.url_slug.clone(),
                description: record.description.clone(),
                launch_date: launch_date.to_string(),
                keywords: String::new(),
                site_title: record.name.clone(),
                meta_description: meta_description.clone(),
                supplier_id: String::new(),
                show_out_of_stock: YES.to_string(),
                kit: String::new(),
                department_id: department_id.clone(),
                department_name: record.department.clone(),
                category_id: category_id.clone(),
                category_name: record.category.clone(),
                brand_id: brand_id.clone(),
                brand_name: record.brand.clone(),
                cubic_weight: String::new(),
                price: record.price.clone(),
                image_base_url: record.image_base_name.clone(),
                saved_images: saved_images.clone(),
                image_urls: image_urls.clone(),
            }
        })
        .collect()
}
