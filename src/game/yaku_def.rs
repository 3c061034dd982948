//! 役定義表
//!
//! 每個役 = 一個獨立的判定函數 + 計分 + 所屬互斥族。
//! 新增變體只要加一張表，不需要修改既有的役。
//!
//! # 架構
//!
//! - `CaptureView`：得牌的唯讀檢視（依類別、標記查詢）
//! - `KOIKOI_YAKU` / `SAKURA_YAKU` / `HACHI_YAKU`：各變體的役表
//!
//! 八八的分數單位為「貫」，結算時換算成點數。

use super::cards::{Card, CardId, CardTag, Category};
use super::scoring::YakuRules;
use super::variants::CombinationSet;
use super::yaku::{YakuFamily, YakuId};

// ============================================================================
// 得牌檢視
// ============================================================================

pub struct CaptureView {
    cards: Vec<Card>,
}

impl CaptureView {
    pub fn new(cards: &[Card]) -> Self {
        Self { cards: cards.to_vec() }
    }

    /// 指定類別的牌
    pub fn of(&self, category: Category) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|c| c.category == category)
            .map(|c| c.id)
            .collect()
    }

    pub fn count(&self, category: Category) -> usize {
        self.cards.iter().filter(|c| c.category == category).count()
    }

    pub fn has(&self, tag: CardTag) -> bool {
        self.cards.iter().any(|c| c.tag == tag)
    }

    /// 指定標記的牌
    pub fn tagged(&self, tag: CardTag) -> Vec<CardId> {
        self.cards.iter().filter(|c| c.tag == tag).map(|c| c.id).collect()
    }

    /// 所有標記都至少有一張時回傳這些牌
    pub fn all_of(&self, tags: &[CardTag]) -> Option<Vec<CardId>> {
        let mut ids = Vec::new();
        for &tag in tags {
            let found = self.tagged(tag);
            if found.is_empty() {
                return None;
            }
            ids.extend(found);
        }
        Some(ids)
    }

    /// カス（菊に盃可另計為カス）
    pub fn chaff(&self, rules: &YakuRules) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|c| c.is_chaff() || (rules.sake_cup_as_chaff && c.tag == CardTag::SakeCup))
            .map(|c| c.id)
            .collect()
    }

    /// 雨（柳に小野道風）取消花見・月見
    fn rained_out(&self, rules: &YakuRules) -> bool {
        rules.rain_cancels_viewing && !rules.rain_proof && self.has(CardTag::RainMan)
    }
}

/// 判定命中
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hit {
    pub points: i32,
    pub cards: Vec<CardId>,
}

impl Hit {
    pub fn new(points: i32, cards: Vec<CardId>) -> Self {
        Self { points, cards }
    }
}

pub type YakuEval = fn(&CaptureView, &YakuRules) -> Option<Hit>;

/// 役定義結構
#[derive(Clone, Copy)]
pub struct YakuDef {
    pub id: YakuId,
    pub family: Option<YakuFamily>,
    pub eval: YakuEval,
}

const fn yaku(id: YakuId, family: Option<YakuFamily>, eval: YakuEval) -> YakuDef {
    YakuDef { id, family, eval }
}

// ============================================================================
// Koi-Koi
// ============================================================================

fn goko(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    let brights = v.of(Category::Bright);
    (brights.len() == 5).then(|| Hit::new(10 + r.bright_bonus, brights))
}

fn shiko(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    let brights = v.of(Category::Bright);
    (brights.len() == 4 && !v.has(CardTag::RainMan)).then(|| Hit::new(8 + r.bright_bonus, brights))
}

fn ame_shiko(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    let brights = v.of(Category::Bright);
    (brights.len() == 4 && v.has(CardTag::RainMan)).then(|| Hit::new(7 + r.bright_bonus, brights))
}

fn sanko(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    let brights = v.of(Category::Bright);
    (brights.len() == 3 && !v.has(CardTag::RainMan)).then(|| Hit::new(5 + r.bright_bonus, brights))
}

fn hanami(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    if v.rained_out(r) {
        return None;
    }
    v.all_of(&[CardTag::Curtain, CardTag::SakeCup])
        .map(|cards| Hit::new(5 + r.viewing_bonus, cards))
}

fn tsukimi(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    if v.rained_out(r) {
        return None;
    }
    v.all_of(&[CardTag::Moon, CardTag::SakeCup])
        .map(|cards| Hit::new(5 + r.viewing_bonus, cards))
}

fn inoshikacho(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    v.all_of(&[CardTag::Boar, CardTag::Deer, CardTag::Butterflies])?;
    let animals = v.of(Category::Animal);
    let extra = animals.len() as i32 - 3;
    Some(Hit::new(5 + extra + r.animal_bonus, animals))
}

fn tane(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    let animals = v.of(Category::Animal);
    (animals.len() >= 5).then(|| Hit::new(1 + (animals.len() as i32 - 5) + r.animal_bonus, animals))
}

fn aka_aotan(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    v.all_of(&[CardTag::PoetryRibbon, CardTag::BlueRibbon])?;
    if v.tagged(CardTag::PoetryRibbon).len() < 3 || v.tagged(CardTag::BlueRibbon).len() < 3 {
        return None;
    }
    let ribbons = v.of(Category::Ribbon);
    let extra = ribbons.len() as i32 - 6;
    Some(Hit::new(10 + extra + r.ribbon_bonus, ribbons))
}

/// 三張同色短冊，其餘短冊每張 +1
fn ribbon_set(v: &CaptureView, r: &YakuRules, tag: CardTag) -> Option<Hit> {
    if v.tagged(tag).len() < 3 {
        return None;
    }
    let ribbons = v.of(Category::Ribbon);
    let extra = ribbons.len() as i32 - 3;
    Some(Hit::new(5 + extra + r.ribbon_bonus, ribbons))
}

fn akatan(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    ribbon_set(v, r, CardTag::PoetryRibbon)
}

fn aotan(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    ribbon_set(v, r, CardTag::BlueRibbon)
}

fn tanzaku(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    let ribbons = v.of(Category::Ribbon);
    (ribbons.len() >= 5).then(|| Hit::new(1 + (ribbons.len() as i32 - 5) + r.ribbon_bonus, ribbons))
}

fn kasu(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    let chaff = v.chaff(r);
    let threshold = r.chaff_threshold;
    (chaff.len() >= threshold).then(|| Hit::new(1 + (chaff.len() - threshold) as i32, chaff))
}

use YakuFamily::{Brights, RedBlue, RibbonCount};

/// Koi-Koi 役表（順序即輸出順序）
pub static KOIKOI_YAKU: [YakuDef; 13] = [
    yaku(YakuId::Goko, Some(Brights), goko),
    yaku(YakuId::Shiko, Some(Brights), shiko),
    yaku(YakuId::AmeShiko, Some(Brights), ame_shiko),
    yaku(YakuId::Sanko, Some(Brights), sanko),
    yaku(YakuId::HanamiZake, None, hanami),
    yaku(YakuId::TsukimiZake, None, tsukimi),
    yaku(YakuId::Inoshikacho, None, inoshikacho),
    yaku(YakuId::Tane, None, tane),
    yaku(YakuId::AkaAotan, Some(RedBlue), aka_aotan),
    yaku(YakuId::Akatan, Some(RedBlue), akatan),
    yaku(YakuId::Aotan, Some(RedBlue), aotan),
    yaku(YakuId::Tanzaku, None, tanzaku),
    yaku(YakuId::Kasu, None, kasu),
];

// ============================================================================
// Sakura（役分數加在牌點上）
// ============================================================================

fn bright_count(v: &CaptureView, n: usize, points: i32) -> Option<Hit> {
    let brights = v.of(Category::Bright);
    (brights.len() >= n).then(|| Hit::new(points, brights))
}

fn set_of(v: &CaptureView, tags: &[CardTag], points: i32) -> Option<Hit> {
    v.all_of(tags).map(|cards| Hit::new(points, cards))
}

/// 三張同色短冊
fn three_ribbons(v: &CaptureView, tag: CardTag, points: i32) -> Option<Hit> {
    let ribbons = v.tagged(tag);
    (ribbons.len() >= 3).then(|| Hit::new(points, ribbons))
}

fn sakura_goko(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    bright_count(v, 5, 50)
}

fn sakura_shiko(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    bright_count(v, 4, 40)
}

fn sakura_sanko(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    bright_count(v, 3, 30)
}

fn sakura_akatan(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    three_ribbons(v, CardTag::PoetryRibbon, 20)
}

fn sakura_aotan(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    three_ribbons(v, CardTag::BlueRibbon, 20)
}

fn sakura_kusatan(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    three_ribbons(v, CardTag::GrassRibbon, 20)
}

fn sakura_inoshikacho(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    set_of(v, &[CardTag::Boar, CardTag::Deer, CardTag::Butterflies], 20)
}

fn sakura_hanami(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    if v.rained_out(r) {
        return None;
    }
    set_of(v, &[CardTag::Curtain, CardTag::SakeCup], 20)
}

fn sakura_tsukimi(v: &CaptureView, r: &YakuRules) -> Option<Hit> {
    if v.rained_out(r) {
        return None;
    }
    set_of(v, &[CardTag::Moon, CardTag::SakeCup], 20)
}

pub static SAKURA_YAKU: [YakuDef; 9] = [
    yaku(YakuId::Goko, Some(Brights), sakura_goko),
    yaku(YakuId::Shiko, Some(Brights), sakura_shiko),
    yaku(YakuId::Sanko, Some(Brights), sakura_sanko),
    yaku(YakuId::HanamiZake, None, sakura_hanami),
    yaku(YakuId::TsukimiZake, None, sakura_tsukimi),
    yaku(YakuId::Inoshikacho, None, sakura_inoshikacho),
    yaku(YakuId::Akatan, None, sakura_akatan),
    yaku(YakuId::Aotan, None, sakura_aotan),
    yaku(YakuId::Kusatan, None, sakura_kusatan),
];

// ============================================================================
// 八八（單位：貫）
// ============================================================================

fn hachi_goko(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    bright_count(v, 5, 10)
}

fn hachi_shiko(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    bright_count(v, 4, 8)
}

fn ribbon_count(v: &CaptureView, n: usize, points: i32) -> Option<Hit> {
    let ribbons = v.of(Category::Ribbon);
    (ribbons.len() >= n).then(|| Hit::new(points, ribbons))
}

fn nanatan(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    ribbon_count(v, 7, 10)
}

fn rokutan(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    ribbon_count(v, 6, 8)
}

fn hachi_akatan(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    three_ribbons(v, CardTag::PoetryRibbon, 5)
}

fn hachi_aotan(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    three_ribbons(v, CardTag::BlueRibbon, 5)
}

fn hachi_kusatan(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    three_ribbons(v, CardTag::GrassRibbon, 3)
}

fn hachi_inoshikacho(v: &CaptureView, _: &YakuRules) -> Option<Hit> {
    set_of(v, &[CardTag::Boar, CardTag::Deer, CardTag::Butterflies], 3)
}

pub static HACHI_YAKU: [YakuDef; 8] = [
    yaku(YakuId::Goko, Some(Brights), hachi_goko),
    yaku(YakuId::Shiko, Some(Brights), hachi_shiko),
    yaku(YakuId::Nanatan, Some(RibbonCount), nanatan),
    yaku(YakuId::Rokutan, Some(RibbonCount), rokutan),
    yaku(YakuId::Akatan, None, hachi_akatan),
    yaku(YakuId::Aotan, None, hachi_aotan),
    yaku(YakuId::Kusatan, None, hachi_kusatan),
    yaku(YakuId::Inoshikacho, None, hachi_inoshikacho),
];

/// 依變體取得役表
pub fn catalog(set: CombinationSet) -> &'static [YakuDef] {
    match set {
        CombinationSet::KoiKoi => &KOIKOI_YAKU,
        CombinationSet::Sakura => &SAKURA_YAKU,
        CombinationSet::HachiHachi => &HACHI_YAKU,
    }
}

// ============================================================================
// 單元測試
// ============================================================================
