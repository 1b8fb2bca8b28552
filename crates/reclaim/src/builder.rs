use shared::config::FeeConfig;
use shared::TokenAccountView;
use solana_sdk::{
    instruction::Instruction, packet::PACKET_DATA_SIZE, pubkey::Pubkey, system_instruction,
    transaction::Transaction,
};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::debug;

use crate::error::CloseError;

/// Service fee charged for closing accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSchedule {
    pub receiver: Option<String>,
    pub lamports_per_account: u64,
}

impl From<&FeeConfig> for FeeSchedule {
    fn from(config: &FeeConfig) -> Self {
        Self {
            receiver: config.receiver.clone(),
            lamports_per_account: config.amount_lamports,
        }
    }
}

/// Unsigned close transaction for one submission attempt
#[derive(Debug, Clone)]
pub struct CloseRequest {
    pub owner: Pubkey,
    pub instructions: Vec<Instruction>,
    /// Payer-bound, no blockhash yet
    pub transaction: Transaction,
    pub closed_mints: HashSet<String>,
    pub account_count: usize,
    pub fee_lamports: u64,
}

/// Assembles burn, close and fee instructions for a batch of token accounts.
///
/// Pure: no network access, no signing.
#[derive(Debug, Clone)]
pub struct CloseTransactionBuilder {
    fees: FeeSchedule,
}

impl CloseTransactionBuilder {
    pub fn new(fees: FeeSchedule) -> Self {
        Self { fees }
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Build one transaction closing every item.
    ///
    /// Per item: a burn of the remaining balance (when non-zero) followed by the close.
    /// A single fee transfer of `fee * items` comes last.
    pub fn build(
        &self,
        owner: Option<Pubkey>,
        items: &[TokenAccountView],
    ) -> Result<CloseRequest, CloseError> {
        if items.is_empty() {
            return Err(CloseError::EmptySelection);
        }
        let owner = owner.ok_or(CloseError::NoSigner)?;
        let receiver = self.fee_receiver()?;

        let mut instructions = Vec::with_capacity(items.len() * 2 + 1);
        for item in items {
            instructions.extend(item_instructions(&owner, item)?);
        }

        let fee_lamports = self
            .fees
            .lamports_per_account
            .checked_mul(items.len() as u64)
            .ok_or_else(|| {
                CloseError::AmountOverflow(format!(
                    "fee {} x {} accounts",
                    self.fees.lamports_per_account,
                    items.len()
                ))
            })?;
        instructions.push(system_instruction::transfer(
            &owner,
            &receiver,
            fee_lamports,
        ));

        let closed_mints: HashSet<String> =
            items.iter().map(|item| item.mint_address.clone()).collect();
        let transaction = Transaction::new_with_payer(&instructions, Some(&owner));

        // Unsigned transactions carry placeholder signatures, so this is the signed size too
        let size = bincode::serialized_size(&transaction)
            .map_err(|e| CloseError::Encoding(e.to_string()))? as usize;
        if size > PACKET_DATA_SIZE {
            return Err(CloseError::TransactionTooLarge {
                accounts: items.len(),
                size,
                limit: PACKET_DATA_SIZE,
            });
        }

        debug!(
            "Built close transaction for {} accounts ({} instructions, {} bytes, fee {} lamports)",
            items.len(),
            instructions.len(),
            size,
            fee_lamports
        );

        Ok(CloseRequest {
            owner,
            instructions,
            transaction,
            closed_mints,
            account_count: items.len(),
            fee_lamports,
        })
    }

    /// Build a transaction closing a single account.
    pub fn build_one(
        &self,
        owner: Option<Pubkey>,
        item: &TokenAccountView,
    ) -> Result<CloseRequest, CloseError> {
        self.build(owner, std::slice::from_ref(item))
    }

    fn fee_receiver(&self) -> Result<Pubkey, CloseError> {
        let receiver = self
            .fees
            .receiver
            .as_deref()
            .map(str::trim)
            .filter(|receiver| !receiver.is_empty())
            .ok_or(CloseError::FeeReceiverUnset)?;

        Pubkey::from_str(receiver)
            .map_err(|e| CloseError::InvalidFeeReceiver(format!("{}: {}", receiver, e)))
    }
}

fn item_instructions(
    owner: &Pubkey,
    item: &TokenAccountView,
) -> Result<Vec<Instruction>, CloseError> {
    let account = Pubkey::from_str(&item.account_address)
        .map_err(|e| CloseError::InvalidAccount(format!("{}: {}", item.account_address, e)))?;

    let mut instructions = Vec::with_capacity(2);

    if item.has_balance() {
        let mint = Pubkey::from_str(&item.mint_address)
            .map_err(|e| CloseError::InvalidAccount(format!("{}: {}", item.mint_address, e)))?;
        let burn = spl_token::instruction::burn(
            &spl_token::id(),
            &account,
            &mint,
            owner,
            &[],
            item.raw_amount,
        )
        .map_err(|e| CloseError::InvalidAccount(format!("{}: {}", item.account_address, e)))?;
        instructions.push(burn);
    }

    let close = spl_token::instruction::close_account(&spl_token::id(), &account, owner, owner, &[])
        .map_err(|e| CloseError::InvalidAccount(format!("{}: {}", item.account_address, e)))?;
    instructions.push(close);

    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::quantity_from_raw;
    use solana_sdk::system_program;

    fn item(raw_amount: u64, decimals: u8) -> TokenAccountView {
        TokenAccountView {
            account_address: Pubkey::new_unique().to_string(),
            mint_address: Pubkey::new_unique().to_string(),
            raw_amount,
            quantity: quantity_from_raw(raw_amount, decimals),
            decimals,
            metadata: None,
            unit_price: None,
        }
    }

    fn builder(fee: u64) -> CloseTransactionBuilder {
        CloseTransactionBuilder::new(FeeSchedule {
            receiver: Some(Pubkey::new_unique().to_string()),
            lamports_per_account: fee,
        })
    }

    fn is_fee_transfer(instruction: &Instruction) -> bool {
        instruction.program_id == system_program::id()
    }

    #[test]
    fn test_single_fee_transfer_for_batch() {
        let owner = Pubkey::new_unique();
        let builder = builder(100_000);
        let items = vec![
            item(0, 6),
            item(0, 6),
            item(0, 6),
        ];

        let request = builder.build(Some(owner), &items).unwrap();

        let transfers: Vec<&Instruction> = request
            .instructions
            .iter()
            .filter(|ix| is_fee_transfer(ix))
            .collect();
        assert_eq!(transfers.len(), 1);
        assert_eq!(request.fee_lamports, 300_000);

        let receiver = Pubkey::from_str(builder.fees().receiver.as_deref().unwrap()).unwrap();
        assert_eq!(
            request.instructions.last().unwrap(),
            &system_instruction::transfer(&owner, &receiver, 300_000)
        );
    }

    #[test]
    fn test_burn_precedes_close() {
        let owner = Pubkey::new_unique();
        let token = item(5_000_000, 6);
        let account = Pubkey::from_str(&token.account_address).unwrap();
        let mint = Pubkey::from_str(&token.mint_address).unwrap();

        let request = builder(100_000).build_one(Some(owner), &token).unwrap();

        let expected_burn =
            spl_token::instruction::burn(&spl_token::id(), &account, &mint, &owner, &[], 5_000_000)
                .unwrap();
        let expected_close =
            spl_token::instruction::close_account(&spl_token::id(), &account, &owner, &owner, &[])
                .unwrap();

        assert_eq!(request.instructions.len(), 3);
        assert_eq!(request.instructions[0], expected_burn);
        assert_eq!(request.instructions[1], expected_close);
        assert!(is_fee_transfer(&request.instructions[2]));
    }

    #[test]
    fn test_zero_quantity_only_closes() {
        let owner = Pubkey::new_unique();
        let token = item(0, 9);
        let account = Pubkey::from_str(&token.account_address).unwrap();

        let request = builder(1).build_one(Some(owner), &token).unwrap();

        assert_eq!(request.instructions.len(), 2);
        assert_eq!(
            request.instructions[0],
            spl_token::instruction::close_account(&spl_token::id(), &account, &owner, &owner, &[])
                .unwrap()
        );
    }

    #[test]
    fn test_mixed_batch_order() {
        let owner = Pubkey::new_unique();
        let items = vec![item(1, 0), item(0, 0)];

        let request = builder(10).build(Some(owner), &items).unwrap();

        let programs: Vec<Pubkey> = request.instructions.iter().map(|ix| ix.program_id).collect();
        assert_eq!(
            programs,
            vec![
                spl_token::id(),
                spl_token::id(),
                spl_token::id(),
                system_program::id()
            ]
        );
        assert_eq!(request.account_count, 2);
        assert_eq!(request.closed_mints.len(), 2);
        assert_eq!(request.transaction.message.account_keys[0], owner);
    }

    #[test]
    fn test_rejects_without_signer() {
        let result = builder(1).build(None, &[item(0, 0)]);
        assert_eq!(result.unwrap_err(), CloseError::NoSigner);
    }

    #[test]
    fn test_rejects_without_fee_receiver() {
        let builder = CloseTransactionBuilder::new(FeeSchedule {
            receiver: None,
            lamports_per_account: 1,
        });

        let result = builder.build(Some(Pubkey::new_unique()), &[item(0, 0)]);
        assert_eq!(result.unwrap_err(), CloseError::FeeReceiverUnset);
    }

    #[test]
    fn test_rejects_invalid_fee_receiver() {
        let builder = CloseTransactionBuilder::new(FeeSchedule {
            receiver: Some("not-an-address".to_string()),
            lamports_per_account: 1,
        });

        let result = builder.build(Some(Pubkey::new_unique()), &[item(0, 0)]);
        assert!(matches!(result, Err(CloseError::InvalidFeeReceiver(_))));
    }

    #[test]
    fn test_rejects_empty_selection() {
        let result = builder(1).build(Some(Pubkey::new_unique()), &[]);
        assert_eq!(result.unwrap_err(), CloseError::EmptySelection);
    }

    #[test]
    fn test_fee_overflow() {
        let items = vec![item(0, 0), item(0, 0)];
        let result = builder(u64::MAX).build(Some(Pubkey::new_unique()), &items);
        assert!(matches!(result, Err(CloseError::AmountOverflow(_))));
    }

    #[test]
    fn test_burns_exact_raw_amount_at_high_decimals() {
        let owner = Pubkey::new_unique();
        let token = item(u64::MAX - 1, 40);
        let account = Pubkey::from_str(&token.account_address).unwrap();
        let mint = Pubkey::from_str(&token.mint_address).unwrap();

        let request = builder(1).build_one(Some(owner), &token).unwrap();

        assert_eq!(
            request.instructions[0],
            spl_token::instruction::burn(&spl_token::id(), &account, &mint, &owner, &[], u64::MAX - 1)
                .unwrap()
        );
    }

    #[test]
    fn test_moderate_batch_fits_one_packet() {
        let items: Vec<TokenAccountView> = (1..=8).map(|raw| item(raw, 6)).collect();
        let request = builder(1).build(Some(Pubkey::new_unique()), &items).unwrap();

        let serialized = bincode::serialize(&request.transaction).unwrap();
        assert!(serialized.len() <= PACKET_DATA_SIZE);
        assert_eq!(request.account_count, 8);
    }

    #[test]
    fn test_rejects_oversized_batch() {
        let items: Vec<TokenAccountView> = (0..64).map(|_| item(0, 0)).collect();

        let result = builder(1).build(Some(Pubkey::new_unique()), &items);

        match result {
            Err(CloseError::TransactionTooLarge {
                accounts,
                size,
                limit,
            }) => {
                assert_eq!(accounts, 64);
                assert_eq!(limit, PACKET_DATA_SIZE);
                assert!(size > limit);
            }
            other => panic!("Expected TransactionTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_account_address() {
        let mut token = item(0, 0);
        token.account_address = "garbage".to_string();

        let result = builder(1).build_one(Some(Pubkey::new_unique()), &token);
        assert!(matches!(result, Err(CloseError::InvalidAccount(_))));
    }
}
