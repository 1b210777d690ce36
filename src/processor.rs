//! Program state processor

use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::invoke_signed,
    program_error::ProgramError,
    program_option::COption,
    program_pack::{IsInitialized, Pack},
    pubkey::Pubkey,
};

use crate::{
    curve::ExponentialCurve,
    error::CurveError,
    instruction::{BuyData, CurveInstruction, InitializeData, SellData, WithdrawData},
    state::{CurveInfo, PROGRAM_VERSION},
    utils::{authority_id, unpack_mint, unpack_token_account},
};

/// Processes an [Instruction](enum.Instruction.html).
pub fn process(program_id: &Pubkey, accounts: &[AccountInfo], input: &[u8]) -> ProgramResult {
    let instruction = CurveInstruction::unpack(input)?;
    match instruction {
        CurveInstruction::Initialize(data) => {
            msg!("Instruction: Initialize");
            process_initialize(program_id, data, accounts)
        }
        CurveInstruction::Buy(BuyData { amount, payment }) => {
            msg!("Instruction: Buy");
            process_buy(program_id, amount, payment, accounts)
        }
        CurveInstruction::Sell(SellData { amount }) => {
            msg!("Instruction: Sell");
            process_sell(program_id, amount, accounts)
        }
        CurveInstruction::Withdraw(WithdrawData { amount }) => {
            msg!("Instruction: Withdraw");
            process_withdraw(program_id, amount, accounts)
        }
    }
}

fn process_initialize(
    program_id: &Pubkey,
    data: InitializeData,
    accounts: &[AccountInfo],
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let curve_info = next_account_info(account_info_iter)?;
    let authority_info = next_account_info(account_info_iter)?;
    let owner_info = next_account_info(account_info_iter)?;
    let token_mint_info = next_account_info(account_info_iter)?;
    let reserve_vault_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;

    if curve_info.owner != program_id {
        return Err(ProgramError::IncorrectProgramId);
    }
    assert_uninitialized::<CurveInfo>(curve_info)?;
    if *authority_info.key != authority_id(program_id, curve_info.key, data.nonce)? {
        return Err(CurveError::InvalidProgramAddress.into());
    }

    let token_program_id = *token_program_info.key;
    let token_mint = unpack_mint(token_mint_info, &token_program_id)?;
    let reserve_vault = unpack_token_account(reserve_vault_info, &token_program_id)?;
    if token_mint.mint_authority != COption::Some(*authority_info.key) {
        return Err(CurveError::InvalidOwner.into());
    }
    if token_mint.freeze_authority.is_some() {
        return Err(CurveError::InvalidFreezeAuthority.into());
    }
    if token_mint.supply != 0 {
        return Err(CurveError::InvalidSupply.into());
    }
    if *authority_info.key != reserve_vault.owner {
        return Err(CurveError::InvalidOwner.into());
    }
    if reserve_vault.delegate.is_some() {
        return Err(CurveError::InvalidDelegate.into());
    }
    if reserve_vault.close_authority.is_some() {
        return Err(CurveError::InvalidCloseAuthority.into());
    }
    if reserve_vault.mint == *token_mint_info.key {
        return Err(CurveError::RepeatedMint.into());
    }

    let curve = ExponentialCurve::new(
        data.base_price,
        data.growth_numerator,
        data.growth_denominator,
        data.max_supply,
        token_mint.decimals,
    )?;
    let current_price = curve.price_at_supply(0)?;

    CurveInfo::pack(
        CurveInfo {
            version: PROGRAM_VERSION,
            nonce: data.nonce,
            is_locked: false,
            owner: *owner_info.key,
            token_mint: *token_mint_info.key,
            reserve_mint: reserve_vault.mint,
            reserve_vault: *reserve_vault_info.key,
            curve,
            current_price,
        },
        &mut curve_info.data.borrow_mut(),
    )?;

    msg!(&format!(
        "Initialize: base_price={}, growth={}/{}, max_supply={}",
        curve.base_price, curve.growth_numerator, curve.growth_denominator, curve.max_supply
    ));
    Ok(())
}

fn process_buy(
    program_id: &Pubkey,
    amount: u64,
    payment: u64,
    accounts: &[AccountInfo],
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let curve_info = next_account_info(account_info_iter)?;
    let authority_info = next_account_info(account_info_iter)?;
    let token_mint_info = next_account_info(account_info_iter)?;
    let source_info = next_account_info(account_info_iter)?;
    let reserve_vault_info = next_account_info(account_info_iter)?;
    let destination_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;

    let mut curve = load_curve(program_id, curve_info, authority_info)?;
    if *token_mint_info.key != curve.token_mint {
        return Err(CurveError::IncorrectMint.into());
    }
    if *reserve_vault_info.key != curve.reserve_vault {
        return Err(CurveError::IncorrectReserveVault.into());
    }
    if source_info.key == reserve_vault_info.key {
        return Err(CurveError::InvalidInput.into());
    }
    let token_mint = unpack_mint(token_mint_info, token_program_info.key)?;
    let buyer = unpack_token_account(source_info, token_program_info.key)?.owner;

    let outcome = curve.execute_buy(token_mint.supply, payment, amount)?;
    curve.lock()?;
    CurveInfo::pack(curve.clone(), &mut curve_info.data.borrow_mut())?;

    token_transfer(
        curve_info.key,
        token_program_info.clone(),
        source_info.clone(),
        reserve_vault_info.clone(),
        authority_info.clone(),
        curve.nonce,
        outcome.total_cost,
    )?;
    token_mint_to(
        curve_info.key,
        token_program_info.clone(),
        token_mint_info.clone(),
        destination_info.clone(),
        authority_info.clone(),
        curve.nonce,
        amount,
    )?;

    curve.unlock();
    CurveInfo::pack(curve, &mut curve_info.data.borrow_mut())?;

    msg!(&format!(
        "Buy: buyer={}, amount={}, total_cost={}, refund={}, price={}",
        buyer, amount, outcome.total_cost, outcome.refund, outcome.new_price
    ));
    Ok(())
}

fn process_sell(program_id: &Pubkey, amount: u64, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let curve_info = next_account_info(account_info_iter)?;
    let authority_info = next_account_info(account_info_iter)?;
    let token_mint_info = next_account_info(account_info_iter)?;
    let source_info = next_account_info(account_info_iter)?;
    let reserve_vault_info = next_account_info(account_info_iter)?;
    let destination_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;

    let mut curve = load_curve(program_id, curve_info, authority_info)?;
    if *token_mint_info.key != curve.token_mint {
        return Err(CurveError::IncorrectMint.into());
    }
    if *reserve_vault_info.key != curve.reserve_vault {
        return Err(CurveError::IncorrectReserveVault.into());
    }
    if destination_info.key == reserve_vault_info.key {
        return Err(CurveError::InvalidInput.into());
    }
    let token_mint = unpack_mint(token_mint_info, token_program_info.key)?;
    let reserve_vault = unpack_token_account(reserve_vault_info, token_program_info.key)?;
    let seller = unpack_token_account(source_info, token_program_info.key)?.owner;

    let quote = curve.execute_sell(token_mint.supply, reserve_vault.amount, amount)?;
    curve.lock()?;
    CurveInfo::pack(curve.clone(), &mut curve_info.data.borrow_mut())?;

    token_burn(
        curve_info.key,
        token_program_info.clone(),
        source_info.clone(),
        token_mint_info.clone(),
        authority_info.clone(),
        curve.nonce,
        amount,
    )?;
    token_transfer(
        curve_info.key,
        token_program_info.clone(),
        reserve_vault_info.clone(),
        destination_info.clone(),
        authority_info.clone(),
        curve.nonce,
        quote.proceeds,
    )?;

    curve.unlock();
    CurveInfo::pack(curve, &mut curve_info.data.borrow_mut())?;

    msg!(&format!(
        "Sell: seller={}, amount={}, proceeds={}, price={}",
        seller, amount, quote.proceeds, quote.new_price
    ));
    Ok(())
}

fn process_withdraw(program_id: &Pubkey, amount: u64, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let curve_info = next_account_info(account_info_iter)?;
    let authority_info = next_account_info(account_info_iter)?;
    let owner_info = next_account_info(account_info_iter)?;
    let reserve_vault_info = next_account_info(account_info_iter)?;
    let destination_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;

    let curve = load_curve(program_id, curve_info, authority_info)?;
    if *reserve_vault_info.key != curve.reserve_vault {
        return Err(CurveError::IncorrectReserveVault.into());
    }
    if destination_info.key == reserve_vault_info.key {
        return Err(CurveError::InvalidInput.into());
    }
    let reserve_vault = unpack_token_account(reserve_vault_info, token_program_info.key)?;
    curve.check_withdraw(
        owner_info.key,
        owner_info.is_signer,
        reserve_vault.amount,
        amount,
    )?;

    token_transfer(
        curve_info.key,
        token_program_info.clone(),
        reserve_vault_info.clone(),
        destination_info.clone(),
        authority_info.clone(),
        curve.nonce,
        amount,
    )?;

    msg!("Withdraw: amount={}", amount);
    Ok(())
}

/// Unpack an initialized curve and check the authority derived from it.
fn load_curve(
    program_id: &Pubkey,
    curve_info: &AccountInfo,
    authority_info: &AccountInfo,
) -> Result<CurveInfo, ProgramError> {
    if curve_info.owner != program_id {
        return Err(ProgramError::IncorrectProgramId);
    }
    let curve = CurveInfo::unpack(&curve_info.data.borrow())?;
    if *authority_info.key != authority_id(program_id, curve_info.key, curve.nonce)? {
        return Err(CurveError::InvalidProgramAddress.into());
    }
    Ok(curve)
}

/// Fail if the account already holds an initialized `T`.
pub fn assert_uninitialized<T: Pack + IsInitialized>(
    account_info: &AccountInfo,
) -> Result<T, ProgramError> {
    let account: T = T::unpack_unchecked(&account_info.data.borrow())?;
    if account.is_initialized() {
        Err(CurveError::AlreadyInUse.into())
    } else {
        Ok(account)
    }
}

/// Issue a spl_token `Transfer` instruction.
fn token_transfer<'a>(
    curve: &Pubkey,
    token_program: AccountInfo<'a>,
    source: AccountInfo<'a>,
    destination: AccountInfo<'a>,
    authority: AccountInfo<'a>,
    nonce: u8,
    amount: u64,
) -> Result<(), ProgramError> {
    let curve_bytes = curve.to_bytes();
    let authority_signature_seeds = [&curve_bytes[..32], &[nonce]];
    let signers = &[&authority_signature_seeds[..]];
    let ix = spl_token::instruction::transfer(
        token_program.key,
        source.key,
        destination.key,
        authority.key,
        &[],
        amount,
    )?;

    invoke_signed(
        &ix,
        &[source, destination, authority, token_program],
        signers,
    )
}

/// Issue a spl_token `MintTo` instruction.
fn token_mint_to<'a>(
    curve: &Pubkey,
    token_program: AccountInfo<'a>,
    mint: AccountInfo<'a>,
    destination: AccountInfo<'a>,
    authority: AccountInfo<'a>,
    nonce: u8,
    amount: u64,
) -> Result<(), ProgramError> {
    let curve_bytes = curve.to_bytes();
    let authority_signature_seeds = [&curve_bytes[..32], &[nonce]];
    let signers = &[&authority_signature_seeds[..]];
    let ix = spl_token::instruction::mint_to(
        token_program.key,
        mint.key,
        destination.key,
        authority.key,
        &[],
        amount,
    )?;

    invoke_signed(&ix, &[mint, destination, authority, token_program], signers)
}

/// Issue a spl_token `Burn` instruction.
fn token_burn<'a>(
    curve: &Pubkey,
    token_program: AccountInfo<'a>,
    burn_account: AccountInfo<'a>,
    mint: AccountInfo<'a>,
    authority: AccountInfo<'a>,
    nonce: u8,
    amount: u64,
) -> Result<(), ProgramError> {
    let curve_bytes = curve.to_bytes();
    let authority_signature_seeds = [&curve_bytes[..32], &[nonce]];
    let signers = &[&authority_signature_seeds[..]];
    let ix = spl_token::instruction::burn(
        token_program.key,
        burn_account.key,
        mint.key,
        authority.key,
        &[],
        amount,
    )?;

    invoke_signed(
        &ix,
        &[burn_account, mint, authority, token_program],
        signers,
    )
}
