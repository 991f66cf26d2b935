use laptop_ranker::parser::{canonical_url, clean_href, parse_cards, parse_price_eur, CardSelectorSpec};
use laptop_ranker::sources::{CDISCOUNT, FNAC};
use laptop_ranker::RankerError;

const CDISCOUNT_PAGE: &str = r#"
<html><body>
  <article data-e2e="offer-item">
    <a href="/informatique/pc-portable/asus-tuf/f-1070992-asu123.html?idOffre=42#avis">
      <h2 data-e2e="lplr-title">ASUS TUF Gaming A15 Ryzen 7 7735HS RTX 4060 16Go 512Go</h2>
    </a>
    <div data-e2e="lplr-price"><s>1 099,99 €</s> <span class="price">899€99</span></div>
  </article>
  <article data-e2e="offer-item" class="offer sponsored-slot">
    <a href="/sponso.html"><h2>Produit sponsorisé</h2></a>
    <div data-e2e="lplr-price">9,99 €</div>
  </article>
  <article class="offerWrapper">
    <a href="//www.cdiscount.com/informatique/pc-portable/lenovo-loq/f-1070992-len456.html" title="Lenovo LOQ 15 i5-12450HX RTX 3050"></a>
    <div class="prices"><span>Prix</span><strong>749,00&nbsp;€</strong></div>
  </article>
  <article data-e2e="offer-item">
    <h2 data-e2e="lplr-title">Carte cadeau</h2>
  </article>
</body></html>
"#;

const FNAC_PAGE: &str = r#"
<html><body>
  <div data-testid="product-item">
    <a data-testid="product-item-link" href="https://www.fnac.com/a18123456/MSI-Katana?oref=abc">
      <span data-testid="product-item-title">MSI Katana 17 B13VGK i7-13620H RTX 4070</span>
    </a>
    <div data-testid="product-price">1 2 9 9 nope</div>
    <div data-testid="pricing-zone">1&#8239;299,99&nbsp;€</div>
  </div>
  <div data-testid="product-item">
    <span data-testid="sponsored-label">Sponsorisé</span>
    <a data-testid="product-item-link" href="/a1/sponsor">Sponsor</a>
  </div>
</body></html>
"#;

#[test]
fn test_price_text_examples() {
    assert_eq!(parse_price_eur("1 199,00 €"), Some(1199.0));
    assert_eq!(parse_price_eur("699,99 €"), Some(699.99));
    assert_eq!(parse_price_eur("1\u{202f}199,00\u{a0}€"), Some(1199.0));
    assert_eq!(parse_price_eur("1.199,00 €"), Some(1199.0));
    assert_eq!(parse_price_eur("1 199€99"), Some(1199.99));
    assert_eq!(parse_price_eur("Prix sur demande"), None);
    assert_eq!(parse_price_eur("0,00 €"), None);
    assert_eq!(parse_price_eur(""), None);
}

#[test]
fn test_cdiscount_cards() {
    let cards = parse_cards(CDISCOUNT_PAGE, &CDISCOUNT.cards).unwrap();

    // the sponsored slot is skipped, the incomplete card is kept for the caller to drop
    assert_eq!(cards.len(), 3);

    assert_eq!(
        cards[0].title.as_deref(),
        Some("ASUS TUF Gaming A15 Ryzen 7 7735HS RTX 4060 16Go 512Go")
    );
    assert_eq!(
        parse_price_eur(cards[0].price_text.as_deref().unwrap()),
        Some(899.99)
    );

    // title from the link's title attribute, price found by scanning for a euro sign
    assert_eq!(cards[1].title.as_deref(), Some("Lenovo LOQ 15 i5-12450HX RTX 3050"));
    assert_eq!(
        cards[1].href.as_deref(),
        Some("//www.cdiscount.com/informatique/pc-portable/lenovo-loq/f-1070992-len456.html")
    );
    assert_eq!(parse_price_eur(cards[1].price_text.as_deref().unwrap()), Some(749.0));

    assert_eq!(cards[2].href, None);
    assert_eq!(cards[2].price_text, None);
}

#[test]
fn test_fnac_cards_skip_sponsored() {
    let cards = parse_cards(FNAC_PAGE, &FNAC.cards).unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(
        cards[0].title.as_deref(),
        Some("MSI Katana 17 B13VGK i7-13620H RTX 4070")
    );
    assert_eq!(
        parse_price_eur(cards[0].price_text.as_deref().unwrap()),
        Some(1299.99)
    );
}

#[test]
fn test_invalid_selector_is_reported() {
    let spec = CardSelectorSpec {
        card: "article[[",
        title: "h2",
        link: "a",
        price: ".price",
        sponsor: None,
        price_scan: "span",
    };
    assert!(matches!(parse_cards("<html></html>", &spec), Err(RankerError::Selector(_))));
}

#[test]
fn test_urls_collapse_to_one_key() {
    let origin = CDISCOUNT.origin;
    let a = clean_href("/informatique/f-1070992-asu123.html?idOffre=42#avis", origin).unwrap();
    let b = clean_href(
        "https://www.cdiscount.com/informatique/f-1070992-asu123.html?utm_source=x",
        origin,
    )
    .unwrap();
    let c = clean_href(
        "https://www.cdiscount.com//www.cdiscount.com/informatique/f-1070992-asu123.html",
        origin,
    )
    .unwrap();

    assert_eq!(canonical_url(&a), canonical_url(&b));
    assert_eq!(canonical_url(&b), canonical_url(&c));
    assert_eq!(
        canonical_url(&a),
        "https://www.cdiscount.com/informatique/f-1070992-asu123.html"
    );
    assert_eq!(clean_href("javascript:void(0)", origin), None);
}
