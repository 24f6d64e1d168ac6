use std::collections::VecDeque;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::model::{
    candidate::Candidate,
    chat::{ChatMessage, CHAT_CAPACITY, MAX_MESSAGE_LENGTH},
    id::Id,
    poll::{new_share_code, NewPoll, Poll},
    results::RankedPoll,
    shop::{NewProduct, Product, Voucher},
    user::User,
};

use super::ranking::PollRanking;

/// In-memory collections of everything except votes.
#[derive(Debug, Default)]
pub struct Registry {
    candidates: Vec<Candidate>,
    users: Vec<User>,
    polls: Vec<Poll>,
    ranking: PollRanking,
    products: Vec<Product>,
    vouchers: Vec<Voucher>,
    chat: VecDeque<ChatMessage>,
}

impl Registry {
    pub fn new(candidates: Vec<Candidate>, users: Vec<User>) -> Self {
        Self {
            candidates,
            users,
            ..Default::default()
        }
    }

    // Candidates

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, id: &Id) -> Option<&Candidate> {
        self.candidates.iter().find(|candidate| &candidate.id == id)
    }

    pub fn add_candidate(&mut self, candidate: Candidate) -> &Candidate {
        self.candidates.push(candidate);
        &self.candidates[self.candidates.len() - 1]
    }

    pub fn remove_candidate(&mut self, id: &Id) -> Result<Candidate> {
        let index = self
            .candidates
            .iter()
            .position(|candidate| &candidate.id == id)
            .ok_or_else(|| Error::not_found(format!("Candidate {id}")))?;
        Ok(self.candidates.remove(index))
    }

    // Users

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, id: &Id) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    /// Usernames are matched case-insensitively.
    pub fn user_by_name(&self, username: &str) -> Option<&User> {
        let username = username.trim();
        self.users
            .iter()
            .find(|user| user.username.eq_ignore_ascii_case(username))
    }

    pub fn add_user(&mut self, user: User) -> Result<&User> {
        if self.user_by_name(&user.username).is_some() {
            return Err(Error::bad_request(format!(
                "Username already in use: {}",
                user.username
            )));
        }
        self.users.push(user);
        Ok(&self.users[self.users.len() - 1])
    }

    pub fn has_admin(&self) -> bool {
        self.users.iter().any(User::is_admin)
    }

    // Polls

    pub fn polls(&self) -> &[Poll] {
        &self.polls
    }

    pub fn poll(&self, id: &Id) -> Option<&Poll> {
        self.polls.iter().find(|poll| &poll.id == id)
    }

    pub fn poll_by_share_code(&self, code: &str) -> Option<&Poll> {
        let code = code.trim();
        self.polls
            .iter()
            .find(|poll| poll.share_code.eq_ignore_ascii_case(code))
    }

    /// Create a poll with a share code no other poll uses.
    pub fn add_poll(&mut self, new_poll: NewPoll, approved: bool) -> Result<&Poll> {
        let share_code = loop {
            let code = new_share_code();
            if self.poll_by_share_code(&code).is_none() {
                break code;
            }
        };
        let poll = new_poll.into_poll(share_code, approved)?;
        self.polls.push(poll);
        Ok(&self.polls[self.polls.len() - 1])
    }

    pub fn approve_poll(&mut self, id: &Id) -> Result<&Poll> {
        let poll = self
            .polls
            .iter_mut()
            .find(|poll| &poll.id == id)
            .ok_or_else(|| Error::not_found(format!("Poll {id}")))?;
        poll.approved = true;
        Ok(poll)
    }

    pub fn remove_poll(&mut self, id: &Id) -> Result<Poll> {
        let index = self
            .polls
            .iter()
            .position(|poll| &poll.id == id)
            .ok_or_else(|| Error::not_found(format!("Poll {id}")))?;
        self.ranking.remove(id);
        Ok(self.polls.remove(index))
    }

    // Ranking

    pub fn ranked_polls(&self) -> Vec<RankedPoll> {
        self.ranking.ranked(&self.polls)
    }

    pub fn set_poll_rank(&mut self, id: &Id, rank: u32) -> Result<()> {
        self.ranking.set(&self.polls, id, rank)
    }

    pub fn swap_poll_ranks(&mut self, first: &Id, second: &Id) -> Result<()> {
        self.ranking.swap(&self.polls, first, second)
    }

    // Products and vouchers

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn add_product(&mut self, new_product: NewProduct) -> Result<&Product> {
        let product = new_product.into_product()?;
        self.products.push(product);
        Ok(&self.products[self.products.len() - 1])
    }

    /// Remove a product. Vouchers already bought for it stay valid.
    pub fn remove_product(&mut self, id: &Id) -> Result<Product> {
        let index = self
            .products
            .iter()
            .position(|product| &product.id == id)
            .ok_or_else(|| Error::not_found(format!("Product {id}")))?;
        Ok(self.products.remove(index))
    }

    pub fn buy_voucher(
        &mut self,
        product_id: &Id,
        recipient: &str,
        purchaser_id: Id,
    ) -> Result<&Voucher> {
        let product = self
            .products
            .iter()
            .find(|product| &product.id == product_id)
            .ok_or_else(|| Error::not_found(format!("Product {product_id}")))?;
        let mut voucher = Voucher::new(product, recipient, purchaser_id)?;
        while self.vouchers.iter().any(|v| v.code == voucher.code) {
            voucher = Voucher::new(product, recipient, voucher.purchaser_id)?;
        }
        self.vouchers.push(voucher);
        Ok(&self.vouchers[self.vouchers.len() - 1])
    }

    pub fn vouchers_bought_by(&self, purchaser_id: &Id) -> Vec<Voucher> {
        self.vouchers
            .iter()
            .filter(|voucher| &voucher.purchaser_id == purchaser_id)
            .cloned()
            .collect()
    }

    pub fn claim_voucher(&mut self, code: &str, contact: &str, user_id: Id) -> Result<&Voucher> {
        let code = code.trim();
        let voucher = self
            .vouchers
            .iter_mut()
            .find(|voucher| voucher.code.eq_ignore_ascii_case(code))
            .ok_or_else(|| Error::not_found(format!("Voucher {code}")))?;
        voucher.claim(contact, user_id)?;
        Ok(voucher)
    }

    // Chat

    pub fn chat(&self) -> Vec<ChatMessage> {
        self.chat.iter().cloned().collect()
    }

    /// Append a message, dropping the oldest once the log is full.
    pub fn post_message(&mut self, user: &User, text: &str) -> Result<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::bad_request("Message must not be empty"));
        }
        if text.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(Error::bad_request(format!(
                "Messages are limited to {MAX_MESSAGE_LENGTH} characters"
            )));
        }
        if self.chat.len() == CHAT_CAPACITY {
            self.chat.pop_front();
        }
        self.chat.push_back(ChatMessage {
            id: Id::generate(),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            text: text.to_string(),
            timestamp: Utc::now(),
        });
        Ok(&self.chat[self.chat.len() - 1])
    }
}
