//! 商店模式
//!
//! 依 `SHOP_STAGES` 逐關挑戰 AI。過關時把關卡分數換成金幣，
//! 在關卡之間用金幣購買護符，護符會影響之後的役判定。

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::game::shop::{SHOP_SLOTS, STAGE_CLEAR_BONUS};
use crate::game::{CharmId, EngineError, Shop, StageDef, VariantConfig, SHOP_STAGES};

use super::action_mask::{execute, Command};
use super::driver::{policies_for, run_until_input};
use super::policy::OpponentPolicy;
use super::session::{MatchState, PlayerSeat};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    InStage,
    Shopping,
    Cleared,
    Failed,
}

pub struct ShopRun {
    rng: StdRng,
    stage_index: usize,
    coins: i64,
    charms: Vec<CharmId>,
    shop: Shop,
    current: MatchState,
    policies: Vec<Option<OpponentPolicy>>,
    status: RunStatus,
}

/// 關卡對局：座位 0 為玩家
fn stage_match(
    stage: &StageDef,
    charms: &[CharmId],
    seed: u64,
) -> Result<(MatchState, Vec<Option<OpponentPolicy>>), EngineError> {
    let config = VariantConfig {
        rounds: stage.rounds,
        charms: charms.to_vec(),
        ..VariantConfig::shop()
    };
    let seats = PlayerSeat::human_vs_ai(2, stage.opponent);
    let policies = policies_for(&seats, seed);
    Ok((MatchState::new(config, seats, seed)?, policies))
}

impl ShopRun {
    pub fn new(seed: u64) -> Result<Self, EngineError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (current, policies) = stage_match(&SHOP_STAGES[0], &[], rng.gen())?;
        let mut run = Self {
            rng,
            stage_index: 0,
            coins: 0,
            charms: Vec::new(),
            shop: Shop::new(),
            current,
            policies,
            status: RunStatus::InStage,
        };
        run.resume()?;
        Ok(run)
    }

    /// 讓 AI 行動到輪到玩家為止，對局結束時結算關卡
    fn resume(&mut self) -> Result<(), EngineError> {
        run_until_input(&mut self.current, &mut self.policies)?;
        if self.current.is_finished() {
            self.finish_stage();
        }
        Ok(())
    }

    /// 玩家在關卡中的指令
    pub fn act(&mut self, command: Command) -> Result<RunStatus, EngineError> {
        if self.status != RunStatus::InStage {
            return Err(EngineError::invalid_action("no stage in progress"));
        }
        execute(&mut self.current, command)?;
        self.resume()?;
        Ok(self.status)
    }

    fn finish_stage(&mut self) {
        let stage = self.stage();
        let score = self.current.totals()[0];
        if score < stage.target_score {
            info!("stage {} failed: {} < {}", stage.name, score, stage.target_score);
            self.status = RunStatus::Failed;
            return;
        }

        self.coins += score.max(0) as i64 + STAGE_CLEAR_BONUS;
        info!("stage {} cleared with {} points, coins={}", stage.name, score, self.coins);
        self.stage_index += 1;
        if self.stage_index >= SHOP_STAGES.len() {
            self.status = RunStatus::Cleared;
        } else {
            self.shop.refresh(&mut self.rng, SHOP_SLOTS, &self.charms);
            self.status = RunStatus::Shopping;
        }
    }

    fn expect_shopping(&self) -> Result<(), EngineError> {
        if self.status == RunStatus::Shopping {
            Ok(())
        } else {
            Err(EngineError::invalid_action("shop is closed"))
        }
    }

    /// 購買商店第 index 個護符
    pub fn buy(&mut self, index: usize) -> Result<CharmId, EngineError> {
        self.expect_shopping()?;
        let cost = self
            .shop
            .items
            .get(index)
            .map(|item| item.cost)
            .ok_or_else(|| EngineError::invalid_action(format!("no shop item {}", index)))?;
        if cost > self.coins {
            return Err(EngineError::invalid_action(format!(
                "costs {}, have {} coins",
                cost, self.coins
            )));
        }
        let item = self
            .shop
            .buy(index)
            .ok_or_else(|| EngineError::invalid_action(format!("no shop item {}", index)))?;
        self.coins -= item.cost;
        self.charms.push(item.charm);
        Ok(item.charm)
    }

    pub fn reroll(&mut self) -> Result<i64, EngineError> {
        self.expect_shopping()?;
        let cost = self.shop.current_reroll_cost();
        if cost > self.coins {
            return Err(EngineError::invalid_action(format!(
                "reroll costs {}, have {} coins",
                cost, self.coins
            )));
        }
        self.coins -= self.shop.reroll(&mut self.rng, SHOP_SLOTS, &self.charms);
        Ok(cost)
    }

    /// 離開商店，開始下一關
    pub fn leave_shop(&mut self) -> Result<(), EngineError> {
        self.expect_shopping()?;
        self.shop.reset_reroll();
        let seed = self.rng.gen();
        let (current, policies) = stage_match(self.stage(), &self.charms, seed)?;
        self.current = current;
        self.policies = policies;
        self.status = RunStatus::InStage;
        self.resume()
    }

    pub fn stage(&self) -> &'static StageDef {
        &SHOP_STAGES[self.stage_index.min(SHOP_STAGES.len() - 1)]
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn coins(&self) -> i64 {
        self.coins
    }

    pub fn charms(&self) -> &[CharmId] {
        &self.charms
    }

    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    pub fn current(&self) -> &MatchState {
        &self.current
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Difficulty;

    /// 用 Hard AI 代替玩家打完目前關卡
    fn autoplay_stage(run: &mut ShopRun) {
        let mut stand_in = OpponentPolicy::new(Difficulty::Hard, 77);
        while run.status() == RunStatus::InStage {
            let game = run.current();
            let command = if game.round().is_over() {
                Command::NextRound
            } else {
                let action = stand_in.choose_action(game.round(), 0).expect("seat 0 must be waiting");
                Command::Round(action)
            };
            run.act(command).unwrap();
        }
    }

    #[test]
    fn test_run_starts_in_first_stage() {
        let mut run = ShopRun::new(1).unwrap();
        assert_eq!(run.stage_index(), 0);
        assert_eq!(run.coins(), 0);
        assert_eq!(run.current().config().rounds, SHOP_STAGES[0].rounds);
        assert!(run.buy(0).is_err());
    }

    #[test]
    fn test_stage_ends_in_shop_or_failure() {
        let mut run = ShopRun::new(2).unwrap();
        autoplay_stage(&mut run);
        match run.status() {
            RunStatus::Shopping => {
                assert_eq!(run.stage_index(), 1);
                assert!(run.coins() >= STAGE_CLEAR_BONUS + SHOP_STAGES[0].target_score as i64);
                assert!(!run.shop().items.is_empty());
            }
            RunStatus::Failed => assert_eq!(run.stage_index(), 0),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_buy_and_reroll_spend_coins() {
        let mut run = ShopRun::new(3).unwrap();
        run.status = RunStatus::Shopping;
        run.coins = 100;
        run.shop.refresh(&mut run.rng, SHOP_SLOTS, &[]);

        let cost = run.shop.items[0].cost;
        let charm = run.buy(0).unwrap();
        assert_eq!(run.coins, 100 - cost);
        assert_eq!(run.charms(), &[charm]);
        assert!(!run.shop.items.iter().any(|i| i.charm == charm));

        let before = run.coins;
        let paid = run.reroll().unwrap();
        assert_eq!(run.coins, before - paid);
        assert!(!run.shop.items.iter().any(|i| i.charm == charm));

        run.coins = 0;
        assert!(run.reroll().is_err());
    }

    #[test]
    fn test_leave_shop_carries_charms() {
        let mut run = ShopRun::new(4).unwrap();
        run.status = RunStatus::Shopping;
        run.stage_index = 1;
        run.charms = vec![CharmId::SakeCharm];
        run.leave_shop().unwrap();
        assert_eq!(run.current().config().charms, vec![CharmId::SakeCharm]);
        assert_eq!(run.stage().name, "Summer");
    }
}
